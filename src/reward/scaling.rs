use crate::common::State;
use anyhow::{ensure, Result};
use cgmath::Vector4;
use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Affine map between the normalized observation space `[-1, 1]^4` seen by the
/// learner and the physical state.
///
/// - `θ1 = o0·π + π`, in `[0, 2π]`
/// - `θ2 = (o1·π + 2π) mod 2π - π`, in `[-π, π)`
/// - `ωi = oi·max_velocity`
///
/// The hanging position `θ = (0, 0)` is therefore at `o = (-1, -1)`. On the
/// second channel `o1 = 1` and `o1 = -1` describe the same configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservationScaling {
    max_velocity: f64,
    max_torque: f64,
}

impl ObservationScaling {
    pub const DEFAULT: ObservationScaling = ObservationScaling {
        max_velocity: 8.0,
        max_torque: 5.0,
    };

    pub fn new(max_velocity: f64, max_torque: f64) -> Result<Self> {
        let scaling = Self {
            max_velocity,
            max_torque,
        };
        scaling.validate()?;
        Ok(scaling)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_velocity.is_finite() && self.max_velocity > 0.0,
            "velocity scale must be finite and positive, got {}",
            self.max_velocity
        );
        ensure!(
            self.max_torque.is_finite() && self.max_torque > 0.0,
            "torque scale must be finite and positive, got {}",
            self.max_torque
        );
        Ok(())
    }

    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }
    pub fn max_torque(&self) -> f64 {
        self.max_torque
    }

    pub fn denormalize(&self, observation: &State) -> State {
        Vector4::new(
            observation.x * PI + PI,
            (observation.y * PI + TWO_PI).rem_euclid(TWO_PI) - PI,
            observation.z * self.max_velocity,
            observation.w * self.max_velocity,
        )
    }

    /// Inverse of [`Self::denormalize`]. The second angle is wrapped to `[-π, π)` first.
    pub fn normalize(&self, state: &State) -> State {
        let theta2 = (state.y + PI).rem_euclid(TWO_PI) - PI;
        let o1 = if theta2 >= 0.0 {
            theta2 / PI - 1.0
        } else {
            theta2 / PI + 1.0
        };
        Vector4::new(
            (state.x - PI) / PI,
            o1,
            state.z / self.max_velocity,
            state.w / self.max_velocity,
        )
    }

    /// Physical torque of the active motor for a normalized action.
    pub fn torque(&self, action: f64) -> f64 {
        action * self.max_torque
    }

    pub fn action(&self, torque: f64) -> f64 {
        torque / self.max_torque
    }
}

impl Default for ObservationScaling {
    fn default() -> Self {
        Self::DEFAULT
    }
}
