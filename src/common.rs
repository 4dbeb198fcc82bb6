use cgmath::{prelude::*, Matrix4, Vector2, Vector4};
use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Double pendulum state `(θ1, θ2, ω1, ω2)`: joint angles followed by joint velocities.
pub type State = Vector4<f64>;

/// One torque per joint.
pub type Torque = Vector2<f64>;

/// The upright position, both links pointing up and at rest.
pub const UPRIGHT: State = Vector4::new(PI, 0.0, 0.0, 0.0);

/// Wrap the angles of `x` so that the upright position has no branch cut nearby:
/// `θ1` lands in `[0, 2π)` and `θ2` in `[-π, π)`. Velocities are untouched.
pub fn wrap_angles_top(x: &State) -> State {
    Vector4::new(
        x.x.rem_euclid(TWO_PI),
        (x.y + PI).rem_euclid(TWO_PI) - PI,
        x.z,
        x.w,
    )
}

/// Wrap both angles of `x` to their representative in `(-π, π]`. Velocities are untouched.
pub fn wrap_angles_diff(x: &State) -> State {
    Vector4::new(wrap_angle(x.x), wrap_angle(x.y), x.z, x.w)
}

/// The representative of `angle` in `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TWO_PI);
    if wrapped > PI {
        wrapped - TWO_PI
    } else {
        wrapped
    }
}

/// Exact quadratic form `xᵗMx`.
pub fn quadratic_form(x: &State, m: &Matrix4<f64>) -> f64 {
    x.dot(*m * *x)
}

/// Like `f64::signum`, but zero maps to zero.
pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
