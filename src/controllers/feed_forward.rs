use crate::{
    common::{State, Torque},
    controllers::ControlLaw,
};
use anyhow::{ensure, Result};
use cgmath::{prelude::*, Vector2};
use log::debug;

/// Replays a fixed torque sequence without looking at the state.
///
/// At time `t` the sample with the largest `T <= t` is used. Before the first
/// and after the last sample the output is zero.
pub struct FeedForward {
    times: Vec<f64>,
    torques: Vec<Torque>,
    torque_limit: Torque,
    finished: bool,
}

impl FeedForward {
    pub fn new(times: Vec<f64>, torques: Vec<Torque>, torque_limit: Torque) -> Result<Self> {
        ensure!(!times.is_empty(), "feed forward needs at least one sample");
        ensure!(
            times.len() == torques.len(),
            "{} times but {} torques",
            times.len(),
            torques.len()
        );
        ensure!(
            times.iter().all(|t| t.is_finite()),
            "feed forward times must be finite"
        );
        ensure!(
            times.windows(2).all(|w| w[0] < w[1]),
            "feed forward times must be strictly increasing"
        );
        ensure!(
            torque_limit.x >= 0.0 && torque_limit.y >= 0.0,
            "torque limit must be non-negative"
        );
        Ok(Self {
            times,
            torques,
            torque_limit,
            finished: false,
        })
    }

    fn sample(&self, t: f64) -> Option<Torque> {
        let last = self.times.len() - 1;
        if t < self.times[0] || t > self.times[last] {
            return None;
        }
        // Number of samples with T <= t
        let index = self.times.partition_point(|&sample| sample <= t).checked_sub(1)?;
        Some(self.torques[index])
    }
}

impl ControlLaw for FeedForward {
    fn reset(&mut self) -> Result<()> {
        self.finished = false;
        Ok(())
    }

    fn get_control_output(&mut self, t: f64, _x: &State) -> Result<Torque> {
        ensure!(t.is_finite(), "feed forward asked for a torque at t = {}", t);
        let u = if let Some(u) = self.sample(t) {
            u
        } else {
            if !self.finished && t > self.times[self.times.len() - 1] {
                debug!("feed forward sequence exhausted at t = {:.4}", t);
                self.finished = true;
            }
            Vector2::zero()
        };
        Ok(Vector2::new(
            u.x.clamp(-self.torque_limit.x, self.torque_limit.x),
            u.y.clamp(-self.torque_limit.y, self.torque_limit.y),
        ))
    }
}
