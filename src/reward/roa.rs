use crate::common::{quadratic_form, wrap_angles_diff, State};
use anyhow::{bail, ensure, Context, Result};
use cgmath::{prelude::*, Matrix2, Matrix3, Matrix4};
use std::{fs, path::Path};

/// Ellipsoidal region of attraction `{x : (x - goal)ᵗ S (x - goal) < ρ}`.
///
/// Built once from externally computed data and shared read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionOfAttraction {
    s: Matrix4<f64>,
    rho: f64,
    goal: State,
}

impl RegionOfAttraction {
    pub fn new(goal: State, rho: f64, s: Matrix4<f64>) -> Result<Self> {
        ensure!(
            rho.is_finite() && rho > 0.0,
            "rho must be finite and positive, got {}",
            rho
        );
        ensure!(s.is_finite(), "S contains non-finite entries");
        for col in 0..4 {
            for row in 0..col {
                let (a, b) = (s[col][row], s[row][col]);
                ensure!(
                    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0),
                    "S is not symmetric: S[{}][{}] = {} but S[{}][{}] = {}",
                    row,
                    col,
                    b,
                    col,
                    row,
                    a
                );
            }
        }
        ensure!(
            leading_minors(&s).iter().all(|&minor| minor > 0.0),
            "S is not positive definite"
        );
        Ok(Self { s, rho, goal })
    }

    /// From the flat arrays of the persisted format: `rho` holds a single value,
    /// `s` the 16 entries of S in row-major order.
    pub fn from_flat(goal: State, rho: &[f64], s: &[f64]) -> Result<Self> {
        let rho = match rho {
            [rho] => *rho,
            other => bail!("expected a single rho value, got {}", other.len()),
        };
        ensure!(
            s.len() == 16,
            "S must be a 4x4 matrix, got {} entries",
            s.len()
        );
        let mut matrix = Matrix4::zero();
        for row in 0..4 {
            for col in 0..4 {
                matrix[col][row] = s[row * 4 + col];
            }
        }
        Self::new(goal, rho, matrix)
    }

    /// From whitespace separated text, as written by `numpy.savetxt`.
    pub fn parse(goal: State, rho: &str, s: &str) -> Result<Self> {
        let rho = parse_numbers(rho).context("While parsing rho")?;
        let s = parse_numbers(s).context("While parsing S")?;
        Self::from_flat(goal, &rho, &s)
    }

    /// Reads the files `rho` and `Smatrix` from `dir`.
    pub fn load(goal: State, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).with_context(|| format!("While reading {:?}", path))
        };
        Self::parse(goal, &read("rho")?, &read("Smatrix")?)
            .with_context(|| format!("While loading region of attraction from {:?}", dir))
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }
    pub fn s(&self) -> &Matrix4<f64> {
        &self.s
    }
    pub fn goal(&self) -> State {
        self.goal
    }

    /// `(x - goal)ᵗ S (x - goal)`, with the angle differences wrapped to `(-π, π]`.
    pub fn radius(&self, x: &State) -> f64 {
        quadratic_form(&wrap_angles_diff(&(*x - self.goal)), &self.s)
    }

    /// Strictly inside the ellipsoid. `x` should already be angle-wrapped.
    pub fn contains(&self, x: &State) -> bool {
        self.radius(x) < self.rho
    }
}

fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Not a number: {:?}", token))
        })
        .collect()
}

// Sylvester's criterion
fn leading_minors(s: &Matrix4<f64>) -> [f64; 4] {
    let m2 = Matrix2::new(s[0][0], s[0][1], s[1][0], s[1][1]);
    let m3 = Matrix3::new(
        s[0][0], s[0][1], s[0][2], s[1][0], s[1][1], s[1][2], s[2][0], s[2][1], s[2][2],
    );
    [s[0][0], m2.determinant(), m3.determinant(), s.determinant()]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::UPRIGHT;
    use cgmath::{assert_relative_eq, Vector4};
    use std::f64::consts::PI;

    fn unit_ball(rho: f64) -> RegionOfAttraction {
        RegionOfAttraction::new(UPRIGHT, rho, Matrix4::identity()).unwrap()
    }

    #[test]
    fn boundary_is_outside() {
        let y = UPRIGHT + Vector4::new(0.0, 0.0, 2.0, 0.0);
        let roa = unit_ball(4.0);
        assert_relative_eq!(roa.radius(&y), 4.0);
        assert!(!roa.contains(&y));
        assert!(unit_ball(4.0 + 1e-9).contains(&y));
        assert!(!unit_ball(4.0 - 1e-9).contains(&y));
    }

    #[test]
    fn angle_differences_wrap() {
        let roa = unit_ball(0.01);
        // Just past upright, on the other side of the branch cut
        assert!(roa.contains(&State::new(-PI + 0.05, 0.0, 0.0, 0.0)));
        assert_relative_eq!(roa.radius(&State::new(-PI + 0.05, 0.0, 0.0, 0.0)), 0.0025, epsilon = 1e-12);
        assert!(roa.contains(&State::new(PI, 2.0 * PI, 0.0, 0.0)));
    }

    #[test]
    fn goal_is_inside() {
        assert!(unit_ball(1e-12).contains(&UPRIGHT));
    }

    #[test]
    fn flat_layout_is_row_major() {
        #[rustfmt::skip]
        let s = [
            2.0, 0.5, 0.0, 0.0,
            0.5, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        let roa = RegionOfAttraction::from_flat(UPRIGHT, &[1.0], &s).unwrap();
        let y = UPRIGHT + Vector4::new(1.0, 1.0, 0.0, 0.0);
        assert_relative_eq!(roa.radius(&y), 2.0 + 0.5 + 0.5 + 1.0);
    }

    #[test]
    fn parse_savetxt_output() {
        let rho = "1.234000000000000000e+00\n";
        let s = "1.0 0.0 0.0 0.0\n0.0 2.0 0.0 0.0\n0.0 0.0 3.0 0.0\n0.0 0.0 0.0 4.0\n";
        let roa = RegionOfAttraction::parse(UPRIGHT, rho, s).unwrap();
        assert_relative_eq!(roa.rho(), 1.234);
        assert_relative_eq!(roa.s()[3][3], 4.0);
        assert_relative_eq!(roa.radius(&State::new(PI, 1.0, 0.0, 0.0)), 2.0);
    }

    #[test]
    fn rejects_malformed_data() {
        let eye: Vec<f64> = (0..16).map(|i| if i % 5 == 0 { 1.0 } else { 0.0 }).collect();
        assert!(RegionOfAttraction::from_flat(UPRIGHT, &[1.0], &eye[..9]).is_err());
        assert!(RegionOfAttraction::from_flat(UPRIGHT, &[1.0, 2.0], &eye).is_err());
        assert!(RegionOfAttraction::from_flat(UPRIGHT, &[], &eye).is_err());
        assert!(RegionOfAttraction::from_flat(UPRIGHT, &[0.0], &eye).is_err());
        assert!(RegionOfAttraction::from_flat(UPRIGHT, &[f64::NAN], &eye).is_err());
        assert!(RegionOfAttraction::parse(UPRIGHT, "1.0", "1 0 0 x").is_err());
    }

    #[test]
    fn rejects_asymmetric_and_indefinite() {
        let mut asymmetric: Matrix4<f64> = Matrix4::identity();
        asymmetric[1][0] = 0.3;
        assert!(RegionOfAttraction::new(UPRIGHT, 1.0, asymmetric).is_err());

        let indefinite = Matrix4::from_diagonal(Vector4::new(1.0, -1.0, 1.0, 1.0));
        assert!(RegionOfAttraction::new(UPRIGHT, 1.0, indefinite).is_err());
    }

    #[test]
    fn load_missing_directory() {
        let err = RegionOfAttraction::load(UPRIGHT, "/nonexistent/roa").unwrap_err();
        assert!(format!("{:?}", err).contains("rho"));
    }
}
