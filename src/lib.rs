#![deny(
    clippy::all,
    clippy::pedantic,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! Building blocks for double pendulum (acrobot and pendubot) experiments:
//! a controller that hands over from a swing-up law to a stabilizer, and a
//! shaped reward for learning the swing-up.

mod common;
mod config;
pub mod controllers;
pub mod environment;
pub mod reward;
mod simulation;
mod trajectory;

pub use common::{
    quadratic_form, wrap_angle, wrap_angles_diff, wrap_angles_top, State, Torque, UPRIGHT,
};
pub use config::{Robot, Stabilization, StabilizerProvider};
pub use controllers::{CombinedController, ControlLaw, SwitchCondition};
pub use simulation::{simulate, Plant};
pub use trajectory::Trajectory;
