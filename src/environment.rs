//! Episode bookkeeping around the reward evaluator, for use by an RL trainer.

use crate::{
    common::State,
    config::Robot,
    reward::{ControlLine, ObservationScaling, RewardEvaluator, SuccessGeometry},
    simulation::Plant,
};
use anyhow::{ensure, Context, Result};
use cgmath::Vector4;
use log::{debug, trace};

/// One transition of the learning problem, on normalized observations and a
/// normalized scalar action. Implemented on top of an external simulator.
pub trait Dynamics {
    fn step(&mut self, observation: &State, action: f64) -> Result<State>;
}

/// [`Dynamics`] backed by a physical [`Plant`]: the observation is
/// denormalized, stepped for `dt` under the torque of the active motor and
/// normalized again. Velocities leaving the observation box are clipped to it.
pub struct PlantDynamics<P> {
    plant: P,
    robot: Robot,
    scaling: ObservationScaling,
    dt: f64,
}

impl<P: Plant> PlantDynamics<P> {
    pub fn new(plant: P, robot: Robot, scaling: ObservationScaling, dt: f64) -> Result<Self> {
        scaling.validate()?;
        ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {}", dt);
        Ok(Self {
            plant,
            robot,
            scaling,
            dt,
        })
    }
}

impl<P: Plant> Dynamics for PlantDynamics<P> {
    fn step(&mut self, observation: &State, action: f64) -> Result<State> {
        let x = self.scaling.denormalize(observation);
        let u = self.robot.torque_from_scalar(self.scaling.torque(action));
        let next = self.plant.step(&x, &u, self.dt)?;
        let mut observation = self.scaling.normalize(&next);
        observation.z = observation.z.clamp(-1.0, 1.0);
        observation.w = observation.w.clamp(-1.0, 1.0);
        Ok(observation)
    }
}

/// Where an episode starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetMode {
    /// Exactly the hanging position `[-1, -1, 0, 0]`.
    Zero,
    /// The hanging position with a little uniform noise, used for training.
    Noisy,
}

impl ResetMode {
    const HANGING: State = Vector4::new(-1.0, -1.0, 0.0, 0.0);

    pub fn initial_observation(self, rng: &mut fastrand::Rng) -> State {
        match self {
            ResetMode::Zero => Self::HANGING,
            ResetMode::Noisy => {
                let mut noise = Vector4::new(rng.f64(), rng.f64(), rng.f64(), rng.f64()) * 0.01;
                noise.z -= 0.05;
                noise.w -= 0.05;
                Self::HANGING + noise
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: State,
    pub reward: f64,
    /// The task was solved.
    pub terminated: bool,
    /// The step budget ran out.
    pub truncated: bool,
}

pub struct Environment<D, G = ControlLine> {
    dynamics: D,
    evaluator: RewardEvaluator<G>,
    reset_mode: ResetMode,
    max_episode_steps: usize,
    rng: fastrand::Rng,
    observation: State,
    steps: usize,
    done: bool,
}

impl<D: Dynamics, G: SuccessGeometry> Environment<D, G> {
    pub fn new(
        dynamics: D,
        evaluator: RewardEvaluator<G>,
        reset_mode: ResetMode,
        max_episode_steps: usize,
        seed: u64,
    ) -> Result<Self> {
        ensure!(max_episode_steps > 0, "an episode needs at least one step");
        let mut rng = fastrand::Rng::with_seed(seed);
        let observation = reset_mode.initial_observation(&mut rng);
        Ok(Self {
            dynamics,
            evaluator,
            reset_mode,
            max_episode_steps,
            rng,
            observation,
            steps: 0,
            done: false,
        })
    }

    pub fn observation(&self) -> State {
        self.observation
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn evaluator(&self) -> &RewardEvaluator<G> {
        &self.evaluator
    }

    pub fn reset(&mut self) -> State {
        self.observation = self.reset_mode.initial_observation(&mut self.rng);
        self.steps = 0;
        self.done = false;
        debug!("episode reset to {:?}", self.observation);
        self.observation
    }

    pub fn step(&mut self, action: f64) -> Result<StepOutcome> {
        ensure!(!self.done, "episode is over, call reset() first");
        let observation = self
            .dynamics
            .step(&self.observation, action)
            .with_context(|| format!("Dynamics failed at step {}", self.steps))?;
        self.steps += 1;

        let reward = self.evaluator.reward(&observation, action);
        let terminated = self.evaluator.terminated(&observation);
        let truncated = !terminated && self.steps >= self.max_episode_steps;
        trace!(
            "step {}: action = {:.4}, reward = {:.4}",
            self.steps,
            action,
            reward
        );

        self.observation = observation;
        self.done = terminated || truncated;
        Ok(StepOutcome {
            observation,
            reward,
            terminated,
            truncated,
        })
    }
}
