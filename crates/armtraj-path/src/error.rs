//! Error types for trajectory construction.

use armtraj_geom::GeomError;
use thiserror::Error;

use crate::chain::PoseId;

/// Errors that can occur while building a trajectory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    /// An argument or setting is outside its allowed range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Input geometry has no well-defined construction.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Following `blend_to` links returned to an already visited waypoint.
    #[error("blend chain is cyclic at waypoint {0:?}")]
    CyclicChain(PoseId),

    /// A motion references a waypoint that is not in the chain.
    #[error("waypoint {0:?} is not in the chain")]
    UnknownPose(PoseId),
}

impl From<GeomError> for TrajectoryError {
    fn from(err: GeomError) -> Self {
        match err {
            GeomError::DegenerateGeometry(msg) => TrajectoryError::DegenerateGeometry(msg),
            GeomError::InvalidArgument(msg) => TrajectoryError::InvalidArgument(msg),
        }
    }
}

/// Result type for trajectory operations.
pub type Result<T> = std::result::Result<T, TrajectoryError>;
