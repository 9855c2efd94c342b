#![warn(missing_docs)]

//! Robotic-arm trajectory construction, corner blending and calibration.
//!
//! Re-exports the member crates and adds the dispatch helpers that turn a
//! Cartesian [`Trajectory`] into joint-space commands through an
//! [`InverseKinematics`] implementation.
//!
//! # Example
//!
//! ```
//! use armtraj::{resolve_and_blend, Motion, Pose, PoseChain, TrajectorySettings};
//!
//! let mut chain = PoseChain::new();
//! let corner = chain.insert(Pose::at(100.0, 0.0, 0.0));
//! let end = chain.insert(Pose::at(100.0, 100.0, 0.0));
//! chain.set_blend(corner, Motion::Lin(end), 5.0).unwrap();
//!
//! let settings = TrajectorySettings::default();
//! let path = resolve_and_blend(&chain, Some(Pose::default()), Motion::Lin(corner), &settings).unwrap();
//! assert_eq!(path.first(), Some(&Pose::default()));
//! assert_eq!(path.end(), Some(&Pose::at(100.0, 100.0, 0.0)));
//! ```

pub use armtraj_calib;
pub use armtraj_geom;
pub use armtraj_math;
pub use armtraj_path;

mod dispatch;

pub use armtraj_calib::{
    calibrate_base_frame, calibrate_tool_offset, BaseFrame, CalibrationError, ToolCalibration,
};
pub use armtraj_geom::{circle_through_three_points, CircleFit, GeomError, SplineKind};
pub use armtraj_math::{Point3, Pose, Tolerance, Transform, Vec3};
pub use armtraj_path::{
    build_arc_trajectory, build_line_trajectory, generate_arc, generate_line_points,
    resolve_and_blend, Corner, CornerKind, Motion, PoseChain, PoseId, Trajectory,
    TrajectoryError, TrajectorySettings, Waypoint,
};
pub use dispatch::{
    joint_speeds, plan_joint_motion, DispatchError, InverseKinematics, JointAngles, JointCommand,
};
