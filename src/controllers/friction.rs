use crate::common::{sign, State, Torque};
use anyhow::{ensure, Result};
use cgmath::Vector2;

/// Static friction model used to feed forward the torque the joints lose to friction.
///
/// Per joint: `damping * ω + coulomb_fric * sgn(ω)`. The compensated torque is
/// clipped to `torque_limit`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionCompensation {
    pub damping: Torque,
    pub coulomb_fric: Torque,
    pub torque_limit: Torque,
}

impl FrictionCompensation {
    pub fn new(damping: Torque, coulomb_fric: Torque, torque_limit: Torque) -> Result<Self> {
        for i in 0..2 {
            ensure!(
                damping[i].is_finite() && coulomb_fric[i].is_finite(),
                "friction coefficients of joint {} must be finite",
                i
            );
            ensure!(
                torque_limit[i].is_finite() && torque_limit[i] >= 0.0,
                "torque limit of joint {} must be finite and non-negative, got {}",
                i,
                torque_limit[i]
            );
        }
        Ok(Self {
            damping,
            coulomb_fric,
            torque_limit,
        })
    }

    /// The friction torque at state `x`. Only the velocities matter.
    pub fn compensation(&self, x: &State) -> Torque {
        let velocity = Vector2::new(x.z, x.w);
        Vector2::new(
            self.damping.x * velocity.x + self.coulomb_fric.x * sign(velocity.x),
            self.damping.y * velocity.y + self.coulomb_fric.y * sign(velocity.y),
        )
    }

    pub fn apply(&self, u: Torque, x: &State) -> Torque {
        let raw = u + self.compensation(x);
        Vector2::new(
            raw.x.clamp(-self.torque_limit.x, self.torque_limit.x),
            raw.y.clamp(-self.torque_limit.y, self.torque_limit.y),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::assert_relative_eq;

    fn hardware_model() -> FrictionCompensation {
        FrictionCompensation::new(
            Vector2::new(0.0, 0.01),
            Vector2::new(0.08, 0.04),
            Vector2::new(6.0, 6.0),
        )
        .unwrap()
    }

    #[test]
    fn opposes_nothing_at_rest() {
        let f = hardware_model();
        let x = State::new(1.0, -2.0, 0.0, 0.0);
        assert_relative_eq!(f.compensation(&x), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn follows_velocity_sign() {
        let f = hardware_model();
        let x = State::new(0.0, 0.0, -3.0, 2.0);
        assert_relative_eq!(
            f.compensation(&x),
            Vector2::new(-0.08, 0.01 * 2.0 + 0.04),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            f.apply(Vector2::new(1.0, 1.0), &x),
            Vector2::new(0.92, 1.06),
            epsilon = 1e-12
        );
    }

    #[test]
    fn clips_to_torque_limit() {
        let f = FrictionCompensation::new(
            Vector2::new(0.5, 0.5),
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 5.0),
        )
        .unwrap();
        let x = State::new(0.0, 0.0, 4.0, -4.0);
        assert_relative_eq!(f.apply(Vector2::new(1.0, -4.0), &x), Vector2::new(0.0, -5.0));
    }

    #[test]
    fn rejects_bad_limits() {
        let zero = Vector2::new(0.0, 0.0);
        assert!(FrictionCompensation::new(zero, zero, Vector2::new(-1.0, 1.0)).is_err());
        assert!(FrictionCompensation::new(Vector2::new(f64::NAN, 0.0), zero, zero).is_err());
    }
}
