use anyhow::Result;
use cgmath::Vector2;
use log::info;
use pendubox::{
    controllers::{FeedForward, FrictionCompensation, NearGoal, Never},
    simulate, CombinedController, ControlLaw, Plant, Robot, Stabilization, StabilizerProvider,
    State, Torque, UPRIGHT,
};
use std::env;

/// Stand-in for the external simulator: every joint is a damped unit inertia.
struct ToyPlant;

impl Plant for ToyPlant {
    fn step(&mut self, x: &State, u: &Torque, dt: f64) -> Result<State> {
        let acc = Vector2::new(u.x - 0.1 * x.z, u.y - 0.1 * x.w);
        Ok(State::new(
            x.x + x.z * dt,
            x.y + x.w * dt,
            x.z + acc.x * dt,
            x.w + acc.y * dt,
        ))
    }
}

/// PD on the distance to the upright position, standing in for the real stabilizers.
struct Pd {
    kp: f64,
    kd: f64,
}

impl ControlLaw for Pd {
    fn get_control_output(&mut self, _t: f64, x: &State) -> Result<Torque> {
        let e = pendubox::wrap_angles_diff(&(UPRIGHT - *x));
        Ok(Vector2::new(
            self.kp * e.x - self.kd * x.z,
            self.kp * e.y - self.kd * x.w,
        ))
    }
}

struct Stabilizers;

impl StabilizerProvider for Stabilizers {
    fn pid(&self) -> Result<Box<dyn ControlLaw>> {
        Ok(Box::new(Pd { kp: 10.0, kd: 0.1 }))
    }
    fn lqr(&self) -> Result<Box<dyn ControlLaw>> {
        Ok(Box::new(Pd { kp: 20.0, kd: 4.0 }))
    }
    fn ilqr_mpc(&self) -> Result<Box<dyn ControlLaw>> {
        anyhow::bail!("no iLQR solver linked into this demo")
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let stabilization: Stabilization = env::args().nth(1).as_deref().unwrap_or("lqr").parse()?;
    let robot = Robot::Pendubot;
    let dt = 0.002;
    let t_final = 10.0;

    // Open loop swing-up: one second of constant shoulder torque
    let times: Vec<f64> = (0..500u32).map(|i| f64::from(i) * dt).collect();
    let torques = vec![robot.torque_from_scalar(2.5); times.len()];
    let swingup = FeedForward::new(times, torques, robot.torque_limit(5.0))?;

    let mut controller = CombinedController::new(
        swingup,
        stabilization.build(&Stabilizers)?,
        Never,
        NearGoal::new(UPRIGHT, State::new(0.2, 0.2, 1.5, 1.5)),
    );
    controller.set_friction_compensation(FrictionCompensation::new(
        Vector2::new(0.0, 0.01),
        Vector2::new(0.08, 0.04),
        Vector2::new(6.0, 6.0),
    )?);

    let recording = simulate(
        &mut ToyPlant,
        &mut controller,
        0.0,
        State::new(0.0, 0.0, 0.0, 0.0),
        t_final,
        dt,
    )?;

    let switch = controller
        .history()
        .iter()
        .find(|h| h.active.number() == 2)
        .map(|h| h.t);
    info!(
        "{} stabilization: {} samples, switched at {:?}, final state {:?}",
        stabilization,
        recording.len(),
        switch,
        recording.x.last()
    );
    Ok(())
}
