//! Shaped reward and episode termination for learning the swing-up.

mod geometry;
mod roa;
mod scaling;

use crate::common::{quadratic_form, wrap_angles_diff, State, UPRIGHT};
use anyhow::{ensure, Result};
use cgmath::{prelude::*, Matrix4, Vector4};
use log::info;
use std::sync::Arc;

pub use geometry::{forward_kinematics, ControlLine, SuccessGeometry};
pub use roa::RegionOfAttraction;
pub use scaling::ObservationScaling;

/// Everything the reward depends on. Fixed for the whole training run.
#[derive(Clone, Debug)]
pub struct RewardSpec<G = ControlLine> {
    pub q: Matrix4<f64>,
    /// Weight of the squared motor torque.
    pub r: f64,
    pub goal: State,
    pub geometry: G,
    pub roa: Arc<RegionOfAttraction>,
    pub scaling: ObservationScaling,
    pub success_bonus: f64,
    /// Added on top of `success_bonus` when the state is also inside the ROA.
    pub roa_bonus: f64,
    pub termination_enabled: bool,
}

impl RewardSpec<ControlLine> {
    /// Quadratic cost around the upright position with the control line and
    /// ROA bonuses. Termination is off.
    pub fn swingup(roa: Arc<RegionOfAttraction>) -> Self {
        Self {
            q: Matrix4::from_diagonal(Vector4::new(10.0, 10.0, 0.4, 0.3)),
            r: 0.0001,
            goal: UPRIGHT,
            geometry: ControlLine::SWINGUP,
            roa,
            scaling: ObservationScaling::DEFAULT,
            success_bonus: 100.0,
            roa_bonus: 1000.0,
            termination_enabled: false,
        }
    }
}

/// How a single reward came about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardBreakdown {
    /// Denormalized state.
    pub state: State,
    /// Angle-wrapped state used for the geometric tests.
    pub wrapped: State,
    pub torque: f64,
    pub cost: f64,
    pub success: bool,
    pub in_roa: bool,
    pub reward: f64,
}

/// Evaluates [`RewardSpec`] on normalized observations and actions.
///
/// Each environment owns one; the ROA inside is shared.
#[derive(Clone, Debug)]
pub struct RewardEvaluator<G = ControlLine> {
    spec: RewardSpec<G>,
}

impl<G: SuccessGeometry> RewardEvaluator<G> {
    pub fn new(spec: RewardSpec<G>) -> Result<Self> {
        spec.scaling.validate()?;
        ensure!(
            spec.roa.goal() == spec.goal,
            "ROA is centered at {:?} but the reward goal is {:?}",
            spec.roa.goal(),
            spec.goal
        );
        ensure!(spec.q.is_finite(), "Q contains non-finite entries");
        ensure!(
            spec.r.is_finite() && spec.r >= 0.0,
            "R must be finite and non-negative, got {}",
            spec.r
        );
        ensure!(
            spec.success_bonus.is_finite() && spec.roa_bonus.is_finite(),
            "bonuses must be finite"
        );
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &RewardSpec<G> {
        &self.spec
    }

    pub fn breakdown(&self, observation: &State, action: f64) -> RewardBreakdown {
        let spec = &self.spec;
        let state = spec.scaling.denormalize(observation);
        let torque = spec.scaling.torque(action);
        let wrapped = wrap_angles_diff(&state);

        let cost = quadratic_form(&(state - spec.goal), &spec.q) + torque * spec.r * torque;
        let success = spec.geometry.is_success(&wrapped);
        let in_roa = spec.roa.contains(&wrapped);

        let mut reward = -cost;
        if success {
            reward += spec.success_bonus;
            if in_roa {
                reward += spec.roa_bonus;
            }
        }

        RewardBreakdown {
            state,
            wrapped,
            torque,
            cost,
            success,
            in_roa,
            reward,
        }
    }

    pub fn reward(&self, observation: &State, action: f64) -> f64 {
        self.breakdown(observation, action).reward
    }

    /// The episode ends once the state enters the ROA, if termination is enabled.
    pub fn terminated(&self, observation: &State) -> bool {
        if !self.spec.termination_enabled {
            return false;
        }
        let state = self.spec.scaling.denormalize(observation);
        let wrapped = wrap_angles_diff(&state);
        let in_roa = self.spec.roa.contains(&wrapped);
        if in_roa {
            info!("terminated: entered the region of attraction at {:?}", state);
        }
        in_roa
    }
}
