use crate::{
    common::{State, Torque},
    controllers::ControlLaw,
    trajectory::Trajectory,
};
use anyhow::{ensure, Context, Result};
use log::{debug, info};

/// The controlled system: a simulator, or hardware behind a control loop.
pub trait Plant {
    /// Advance from `x` under torque `u` for `dt` seconds.
    fn step(&mut self, x: &State, u: &Torque, dt: f64) -> Result<State>;
}

/// Run `controller` in closed loop with `plant` from `t0` to `tf`.
///
/// The recorded trajectory holds one row per control tick: the time, the state
/// the controller saw and the torque it answered with. The final state is
/// appended with the torque of the last tick.
pub fn simulate<P, C>(
    plant: &mut P,
    controller: &mut C,
    t0: f64,
    x0: State,
    tf: f64,
    dt: f64,
) -> Result<Trajectory>
where
    P: Plant + ?Sized,
    C: ControlLaw + ?Sized,
{
    ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {}", dt);
    ensure!(
        t0.is_finite() && tf.is_finite() && tf >= t0,
        "need t0 <= tf, got t0 = {} and tf = {}",
        t0,
        tf
    );
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = ((tf - t0) / dt).round() as usize;

    controller.init().context("While initializing the controller")?;
    info!("simulating {} steps of {} s from t = {}", steps, dt, t0);

    let mut recording = Trajectory::default();
    let mut x = x0;
    let mut u = Torque::new(0.0, 0.0);
    for step in 0..steps {
        #[allow(clippy::cast_precision_loss)]
        let t = t0 + step as f64 * dt;
        u = controller
            .get_control_output(t, &x)
            .with_context(|| format!("Controller failed at t = {:.4}", t))?;
        recording.push(t, x, u);
        x = plant
            .step(&x, &u, dt)
            .with_context(|| format!("Plant failed at t = {:.4}", t))?;
    }
    #[allow(clippy::cast_precision_loss)]
    let t_end = t0 + steps as f64 * dt;
    recording.push(t_end, x, u);
    debug!("simulation finished at x = {:?}", x);
    Ok(recording)
}
