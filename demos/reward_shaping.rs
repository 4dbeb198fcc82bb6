use anyhow::Result;
use log::info;
use pendubox::{
    environment::{Environment, PlantDynamics, ResetMode},
    reward::{ObservationScaling, RegionOfAttraction, RewardEvaluator, RewardSpec},
    Plant, Robot, State, Torque, UPRIGHT,
};
use std::sync::Arc;

const RHO: &str = "1.1e+00\n";
const S_MATRIX: &str = "\
2.0 0.1 0.0 0.0
0.1 1.0 0.0 0.0
0.0 0.0 0.2 0.0
0.0 0.0 0.0 0.1
";

/// Stand-in for the external simulator: every joint is a unit inertia.
struct ToyPlant;

impl Plant for ToyPlant {
    fn step(&mut self, x: &State, u: &Torque, dt: f64) -> Result<State> {
        Ok(State::new(
            x.x + x.z * dt,
            x.y + x.w * dt,
            x.z + u.x * dt,
            x.w + u.y * dt,
        ))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // One ROA for all environments
    let roa = Arc::new(RegionOfAttraction::parse(UPRIGHT, RHO, S_MATRIX)?);

    let mut rng = fastrand::Rng::with_seed(42);
    for (worker, reset_mode) in (0u64..).zip([ResetMode::Zero, ResetMode::Noisy]) {
        let mut spec = RewardSpec::swingup(roa.clone());
        spec.termination_enabled = true;
        let dynamics =
            PlantDynamics::new(ToyPlant, Robot::Acrobot, ObservationScaling::DEFAULT, 0.01)?;
        let evaluator = RewardEvaluator::new(spec)?;
        let mut env = Environment::new(dynamics, evaluator, reset_mode, 1000, worker)?;

        let mut total = 0.0;
        loop {
            let action = rng.f64() * 2.0 - 1.0;
            let outcome = env.step(action)?;
            total += outcome.reward;
            if outcome.terminated || outcome.truncated {
                info!(
                    "{:?} reset: {} steps, return {:.1}, solved: {}",
                    reset_mode,
                    env.steps(),
                    total,
                    outcome.terminated
                );
                break;
            }
        }
    }
    Ok(())
}
