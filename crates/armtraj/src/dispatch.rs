//! Joint-space dispatch helpers.
//!
//! The inverse-kinematics service that maps Cartesian poses to joint angles
//! lives outside this crate; [`InverseKinematics`] is the seam it plugs into.

use armtraj_math::Pose;
use armtraj_path::Trajectory;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while turning a trajectory into joint commands.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Mismatched joint counts, zero steps or a bad speed multiplier.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The inverse-kinematics implementation failed.
    #[error("inverse kinematics failed: {0}")]
    Kinematics(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Joint angles of the arm, in degrees, base joint first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointAngles(pub Vec<f64>);

impl JointAngles {
    /// Number of joints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no joints are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The angles as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for JointAngles {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

/// Maps Cartesian poses to joint angles.
pub trait InverseKinematics {
    /// Error reported by the solver.
    type Error: std::error::Error + Send + Sync + 'static;

    /// One joint solution per input pose, in order.
    fn solve(&self, poses: &[Pose]) -> std::result::Result<Vec<JointAngles>, Self::Error>;
}

/// A joint target and the per-joint speeds that reach it in step with the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointCommand {
    /// Target joint angles.
    pub angles: JointAngles,
    /// Per-joint angular speed.
    pub speeds: Vec<f64>,
}

/// Per-joint speed `|to - from| / steps × multiplier`, so every joint
/// finishes its move in the same number of controller steps.
pub fn joint_speeds(from: &JointAngles, to: &JointAngles, steps: u32, multiplier: f64) -> Result<Vec<f64>> {
    if from.len() != to.len() {
        return Err(DispatchError::InvalidArgument(format!(
            "joint count mismatch: {} vs {}",
            from.len(),
            to.len()
        )));
    }
    if steps == 0 {
        return Err(DispatchError::InvalidArgument("steps must be positive".into()));
    }
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(DispatchError::InvalidArgument(format!(
            "speed multiplier must be positive, got {multiplier}"
        )));
    }
    let steps = f64::from(steps);
    Ok(from
        .0
        .iter()
        .zip(&to.0)
        .map(|(a, b)| (b - a).abs() / steps * multiplier)
        .collect())
}

/// Solve every trajectory pose through `ik` and pair each joint target with
/// its speeds from the previous target, the first from `current`.
pub fn plan_joint_motion<K: InverseKinematics>(
    trajectory: &Trajectory,
    ik: &K,
    current: &JointAngles,
    steps: u32,
    multiplier: f64,
) -> Result<Vec<JointCommand>> {
    let solutions = ik
        .solve(trajectory.points())
        .map_err(|e| DispatchError::Kinematics(Box::new(e)))?;
    if solutions.len() != trajectory.len() {
        return Err(DispatchError::InvalidArgument(format!(
            "inverse kinematics returned {} solutions for {} poses",
            solutions.len(),
            trajectory.len()
        )));
    }

    let mut previous = current;
    let mut commands = Vec::with_capacity(solutions.len());
    for angles in &solutions {
        let speeds = joint_speeds(previous, angles, steps, multiplier)?;
        commands.push(JointCommand {
            angles: angles.clone(),
            speeds,
        });
        previous = angles;
    }
    debug!(commands = commands.len(), "planned joint motion");
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("unreachable pose")]
    struct Unreachable;

    /// Treats the position channels as three joint angles.
    struct Cartesian;

    impl InverseKinematics for Cartesian {
        type Error = Unreachable;

        fn solve(&self, poses: &[Pose]) -> std::result::Result<Vec<JointAngles>, Unreachable> {
            Ok(poses
                .iter()
                .map(|p| JointAngles(vec![p.x, p.y, p.z]))
                .collect())
        }
    }

    struct Failing;

    impl InverseKinematics for Failing {
        type Error = Unreachable;

        fn solve(&self, _poses: &[Pose]) -> std::result::Result<Vec<JointAngles>, Unreachable> {
            Err(Unreachable)
        }
    }

    #[test]
    fn test_joint_speeds() {
        let from = JointAngles(vec![0.0, 10.0, -20.0]);
        let to = JointAngles(vec![30.0, 10.0, 20.0]);
        let speeds = joint_speeds(&from, &to, 10, 2.0).unwrap();
        assert_eq!(speeds, vec![6.0, 0.0, 8.0]);
    }

    #[test]
    fn test_joint_speeds_rejects_bad_input() {
        let a = JointAngles(vec![0.0; 6]);
        let b = JointAngles(vec![0.0; 5]);
        assert!(matches!(joint_speeds(&a, &b, 10, 1.0), Err(DispatchError::InvalidArgument(_))));
        assert!(matches!(joint_speeds(&a, &a, 0, 1.0), Err(DispatchError::InvalidArgument(_))));
        assert!(matches!(joint_speeds(&a, &a, 1, -1.0), Err(DispatchError::InvalidArgument(_))));
    }

    #[test]
    fn test_plan_chains_speeds_from_previous_target() {
        let trajectory = Trajectory::from_points(vec![Pose::at(10.0, 0.0, 0.0), Pose::at(10.0, 20.0, 0.0)]);
        let commands =
            plan_joint_motion(&trajectory, &Cartesian, &JointAngles(vec![0.0; 3]), 5, 1.0).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].speeds, vec![2.0, 0.0, 0.0]);
        assert_eq!(commands[1].speeds, vec![0.0, 4.0, 0.0]);
        assert_eq!(commands[1].angles, JointAngles(vec![10.0, 20.0, 0.0]));
    }

    #[test]
    fn test_command_json_shape() {
        let command = JointCommand {
            angles: JointAngles(vec![1.0, 2.0]),
            speeds: vec![0.5, 0.25],
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["angles"], serde_json::json!([1.0, 2.0]));
        assert_eq!(json["speeds"][1], 0.25);
    }

    #[test]
    fn test_kinematics_failure_is_wrapped() {
        let trajectory = Trajectory::from_points(vec![Pose::default()]);
        let err = plan_joint_motion(&trajectory, &Failing, &JointAngles::default(), 1, 1.0).unwrap_err();
        assert!(matches!(err, DispatchError::Kinematics(_)));
        assert_eq!(err.to_string(), "inverse kinematics failed: unreachable pose");
    }
}
