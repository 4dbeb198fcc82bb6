use crate::common::{State, Torque};
use anyhow::{ensure, Result};

/// Time series of states and inputs, one row per sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub t: Vec<f64>,
    pub x: Vec<State>,
    pub u: Vec<Torque>,
}

impl Trajectory {
    pub fn new(t: Vec<f64>, x: Vec<State>, u: Vec<Torque>) -> Result<Self> {
        ensure!(
            t.len() == x.len() && t.len() == u.len(),
            "trajectory columns differ in length: {} times, {} states, {} inputs",
            t.len(),
            x.len(),
            u.len()
        );
        ensure!(
            t.windows(2).all(|w| w[0] < w[1]),
            "trajectory times must be strictly increasing"
        );
        Ok(Self { t, x, u })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub(crate) fn push(&mut self, t: f64, x: State, u: Torque) {
        self.t.push(t);
        self.x.push(x);
        self.u.push(u);
    }

    /// `(dt, t_final)`, where `dt` is the spacing of the first two samples.
    pub fn properties(&self) -> Result<(f64, f64)> {
        ensure!(
            self.len() >= 2,
            "need at least two samples, trajectory has {}",
            self.len()
        );
        Ok((self.t[1] - self.t[0], self.t[self.len() - 1]))
    }
}
