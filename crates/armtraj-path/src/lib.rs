#![warn(missing_docs)]

//! Trajectory construction and corner blending for robotic arms.
//!
//! This crate turns chains of Cartesian waypoints into dense pose
//! sequences. Straight (LIN) and circular (CIRC) motions are sampled
//! uniformly, and the corner between two consecutive motions is replaced by
//! a spline transition that starts a blend distance before the corner and
//! rejoins the next motion the same distance after it.
//!
//! # Example
//!
//! ```
//! use armtraj_math::Pose;
//! use armtraj_path::{resolve_and_blend, Motion, PoseChain, TrajectoryError, TrajectorySettings};
//!
//! fn main() -> Result<(), TrajectoryError> {
//!     let mut chain = PoseChain::new();
//!     let p = chain.insert(Pose::at(100.0, 0.0, 0.0));
//!     let q = chain.insert(Pose::at(100.0, 100.0, 0.0));
//!     chain.set_blend(p, Motion::Lin(q), 5.0)?;
//!
//!     let settings = TrajectorySettings::default();
//!     let trajectory = resolve_and_blend(&chain, Some(Pose::default()), Motion::Lin(p), &settings)?;
//!     assert_eq!(trajectory.len(), 3 * settings.sample_count - 2);
//!     assert_eq!(trajectory.end(), Some(&Pose::at(100.0, 100.0, 0.0)));
//!     Ok(())
//! }
//! ```

mod blend;
pub mod chain;
pub mod error;
pub mod primitive;
pub mod settings;
pub mod trajectory;

pub use chain::{Corner, CornerKind, Motion, PoseChain, PoseId, Waypoint, DEFAULT_BLEND_DISTANCE};
pub use error::{Result, TrajectoryError};
pub use primitive::{generate_arc, generate_line_points, ArcPath, ArcSamples, MIN_ARC_ANGLE_DEGREES};
pub use settings::TrajectorySettings;
pub use trajectory::{build_arc_trajectory, build_line_trajectory, resolve_and_blend, Trajectory};
