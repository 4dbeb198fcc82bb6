use crate::{common::Torque, controllers::ControlLaw};
use anyhow::{bail, Result};
use cgmath::Vector2;
use std::{fmt, str::FromStr};

/// Which joint of the double pendulum carries the motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Robot {
    /// Actuated elbow, passive shoulder.
    Acrobot,
    /// Actuated shoulder, passive elbow.
    Pendubot,
}

impl Robot {
    pub const fn active_actuator(self) -> usize {
        match self {
            Robot::Acrobot => 1,
            Robot::Pendubot => 0,
        }
    }

    /// Per-joint torque limit when the active motor may deliver `max_torque`.
    pub fn torque_limit(self, max_torque: f64) -> Torque {
        match self {
            Robot::Acrobot => Vector2::new(0.0, max_torque),
            Robot::Pendubot => Vector2::new(max_torque, 0.0),
        }
    }

    /// Spread a single-motor command onto both joints.
    pub fn torque_from_scalar(self, tau: f64) -> Torque {
        let mut torque = Vector2::new(0.0, 0.0);
        torque[self.active_actuator()] = tau;
        torque
    }
}

impl FromStr for Robot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "acrobot" => Ok(Robot::Acrobot),
            "pendubot" => Ok(Robot::Pendubot),
            other => bail!("unknown robot variant {:?}", other),
        }
    }
}

/// The controller that takes over once the swing-up is close to the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stabilization {
    Pid,
    Lqr,
    IlqrMpc,
}

/// Builds the concrete stabilizing controllers. The control laws themselves
/// live outside this crate.
pub trait StabilizerProvider {
    fn pid(&self) -> Result<Box<dyn ControlLaw>>;
    fn lqr(&self) -> Result<Box<dyn ControlLaw>>;
    fn ilqr_mpc(&self) -> Result<Box<dyn ControlLaw>>;
}

impl Stabilization {
    /// Resolve the variant into a controller. Meant to be called once, while
    /// assembling the experiment.
    pub fn build(self, provider: &impl StabilizerProvider) -> Result<Box<dyn ControlLaw>> {
        match self {
            Stabilization::Pid => provider.pid(),
            Stabilization::Lqr => provider.lqr(),
            Stabilization::IlqrMpc => provider.ilqr_mpc(),
        }
    }
}

impl FromStr for Stabilization {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pid" => Ok(Stabilization::Pid),
            "lqr" => Ok(Stabilization::Lqr),
            "ilqr" | "ilqr_mpc" => Ok(Stabilization::IlqrMpc),
            other => bail!("unknown stabilization mode {:?}", other),
        }
    }
}

impl fmt::Display for Stabilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stabilization::Pid => "pid",
            Stabilization::Lqr => "lqr",
            Stabilization::IlqrMpc => "ilqr",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::State;

    struct Tagged(f64);

    impl ControlLaw for Tagged {
        fn get_control_output(&mut self, _t: f64, _x: &State) -> Result<Torque> {
            Ok(Vector2::new(self.0, 0.0))
        }
    }

    struct Provider;

    impl StabilizerProvider for Provider {
        fn pid(&self) -> Result<Box<dyn ControlLaw>> {
            Ok(Box::new(Tagged(1.0)))
        }
        fn lqr(&self) -> Result<Box<dyn ControlLaw>> {
            Ok(Box::new(Tagged(2.0)))
        }
        fn ilqr_mpc(&self) -> Result<Box<dyn ControlLaw>> {
            bail!("no mpc solver on this machine")
        }
    }

    #[test]
    fn parse_stabilization() {
        assert_eq!("pid".parse::<Stabilization>().unwrap(), Stabilization::Pid);
        assert_eq!("lqr".parse::<Stabilization>().unwrap(), Stabilization::Lqr);
        assert_eq!("ilqr".parse::<Stabilization>().unwrap(), Stabilization::IlqrMpc);
        assert!("LQR".parse::<Stabilization>().is_err());
        for mode in [Stabilization::Pid, Stabilization::Lqr, Stabilization::IlqrMpc] {
            assert_eq!(mode.to_string().parse::<Stabilization>().unwrap(), mode);
        }
    }

    #[test]
    fn build_dispatches_to_provider() {
        let x = State::new(0.0, 0.0, 0.0, 0.0);
        let mut lqr = Stabilization::Lqr.build(&Provider).unwrap();
        assert_eq!(lqr.get_control_output(0.0, &x).unwrap(), Vector2::new(2.0, 0.0));
        let mut pid = Stabilization::Pid.build(&Provider).unwrap();
        assert_eq!(pid.get_control_output(0.0, &x).unwrap(), Vector2::new(1.0, 0.0));
        assert!(Stabilization::IlqrMpc.build(&Provider).is_err());
    }

    #[test]
    fn robot_variants() {
        assert_eq!("acrobot".parse::<Robot>().unwrap(), Robot::Acrobot);
        assert_eq!(Robot::Acrobot.torque_limit(5.0), Vector2::new(0.0, 5.0));
        assert_eq!(Robot::Pendubot.torque_limit(5.0), Vector2::new(5.0, 0.0));
        assert_eq!(Robot::Acrobot.torque_from_scalar(-2.5), Vector2::new(0.0, -2.5));
        assert_eq!(Robot::Pendubot.torque_from_scalar(-2.5), Vector2::new(-2.5, 0.0));
    }
}
