mod combined;
mod feed_forward;
mod friction;

use crate::common::{wrap_angles_top, State, Torque};
use anyhow::Result;
use log::trace;

pub use combined::{ActiveLaw, CombinedController, HistoryEntry, SwitchMode};
pub use feed_forward::FeedForward;
pub use friction::FrictionCompensation;

/// Anything that turns a measured state into joint torques.
///
/// Implementations usually live outside this crate (LQR, iLQR-MPC, PID, ...).
/// Failures are reported through the `Result` and must not be papered over:
/// the torque goes to a real or simulated motor.
pub trait ControlLaw: Send {
    /// Called once before the first control output.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
    fn get_control_output(&mut self, t: f64, x: &State) -> Result<Torque>;
}

impl<L: ControlLaw + ?Sized> ControlLaw for Box<L> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }
    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
    fn get_control_output(&mut self, t: f64, x: &State) -> Result<Torque> {
        (**self).get_control_output(t, x)
    }
}

/// Decides at time `t` and state `x` whether a [`CombinedController`] should
/// hand control to the law the condition belongs to.
pub trait SwitchCondition: Send {
    fn check(&self, t: f64, x: &State) -> bool;
}

impl<F> SwitchCondition for F
where
    F: Fn(f64, &State) -> bool + Send,
{
    fn check(&self, t: f64, x: &State) -> bool {
        self(t, x)
    }
}

/// Never fires.
#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl SwitchCondition for Never {
    fn check(&self, _t: f64, _x: &State) -> bool {
        false
    }
}

/// Fires once `t` has reached `switch_time`.
#[derive(Clone, Copy, Debug)]
pub struct AfterTime {
    pub switch_time: f64,
}

impl SwitchCondition for AfterTime {
    fn check(&self, t: f64, _x: &State) -> bool {
        t >= self.switch_time
    }
}

/// Fires when every component of the top-wrapped state is within `eps` of `goal`.
#[derive(Clone, Copy, Debug)]
pub struct NearGoal {
    pub goal: State,
    pub eps: State,
}

impl NearGoal {
    pub fn new(goal: State, eps: State) -> Self {
        Self { goal, eps }
    }
}

impl SwitchCondition for NearGoal {
    fn check(&self, t: f64, x: &State) -> bool {
        let y = wrap_angles_top(x);
        let delta = (y - self.goal).map(f64::abs) - self.eps;
        let max_diff = [delta.x, delta.y, delta.z, delta.w]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let near = max_diff <= 0.0;
        trace!("near goal at t = {:.4}: {} (x = {:?})", t, near, x);
        near
    }
}
