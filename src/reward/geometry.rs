use crate::common::State;
use cgmath::Vector2;

/// Decides from the (angle-wrapped) state whether the task looks solved.
pub trait SuccessGeometry: Send + Sync {
    fn is_success(&self, y: &State) -> bool;
}

impl<F> SuccessGeometry for F
where
    F: Fn(&State) -> bool + Send + Sync,
{
    fn is_success(&self, y: &State) -> bool {
        self(y)
    }
}

/// Elbow and end effector positions of a double pendulum hanging from the
/// origin. Angles are measured from the downward vertical, `y` points up.
pub fn forward_kinematics(link_lengths: Vector2<f64>, theta1: f64, theta2: f64) -> [Vector2<f64>; 2] {
    let elbow = Vector2::new(
        link_lengths.x * theta1.sin(),
        -link_lengths.x * theta1.cos(),
    );
    let end_effector = elbow
        + Vector2::new(
            link_lengths.y * (theta1 + theta2).sin(),
            -link_lengths.y * (theta1 + theta2).cos(),
        );
    [elbow, end_effector]
}

/// Success once the end effector reaches `height` or above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlLine {
    pub link_lengths: Vector2<f64>,
    pub height: f64,
}

impl ControlLine {
    /// The swing-up task of the RL setup: 0.2 m and 0.3 m links, line at 0.4 m.
    pub const SWINGUP: ControlLine = ControlLine {
        link_lengths: Vector2::new(0.2, 0.3),
        height: 0.4,
    };

    pub fn end_effector(&self, y: &State) -> Vector2<f64> {
        forward_kinematics(self.link_lengths, y.x, y.y)[1]
    }
}

impl SuccessGeometry for ControlLine {
    fn is_success(&self, y: &State) -> bool {
        self.end_effector(y).y >= self.height
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn hanging_and_upright() {
        let links = Vector2::new(0.2, 0.3);
        let [elbow, ee] = forward_kinematics(links, 0.0, 0.0);
        assert_relative_eq!(elbow, Vector2::new(0.0, -0.2));
        assert_relative_eq!(ee, Vector2::new(0.0, -0.5));
        let [elbow, ee] = forward_kinematics(links, PI, 0.0);
        assert_relative_eq!(elbow, Vector2::new(0.0, 0.2), epsilon = 1e-12);
        assert_relative_eq!(ee, Vector2::new(0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn horizontal_links() {
        let [elbow, ee] = forward_kinematics(Vector2::new(0.2, 0.3), PI / 2.0, -PI / 2.0);
        assert_relative_eq!(elbow, Vector2::new(0.2, 0.0), epsilon = 1e-12);
        assert_relative_eq!(ee, Vector2::new(0.2, -0.3), epsilon = 1e-12);
    }

    #[test]
    fn control_line() {
        let line = ControlLine::SWINGUP;
        assert!(line.is_success(&State::new(PI, 0.0, 0.0, 0.0)));
        assert!(line.is_success(&State::new(-PI + 0.3, 0.2, 5.0, 5.0)));
        assert!(!line.is_success(&State::new(0.0, 0.0, 0.0, 0.0)));
        // Elbow bent sideways drops the tip below the line
        assert!(!line.is_success(&State::new(PI, PI / 2.0, 0.0, 0.0)));
    }
}
