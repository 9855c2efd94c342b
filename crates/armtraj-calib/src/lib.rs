#![warn(missing_docs)]

//! Calibration routines for a robotic arm.
//!
//! - **Tool offset**: recover the tool-tip offset in the flange frame from
//!   four flange poses that all touch the same fixed point.
//! - **Base frame**: derive a work frame from three probed points (origin,
//!   a point on its X axis, a point on its Y axis).

mod base;
pub mod solver;
mod tool;

pub use base::{calibrate_base_frame, BaseFrame, BASE_CALIBRATION_POINTS};
pub use solver::{LmConfig, LmReport};
pub use tool::{calibrate_tool_offset, solve_tool_offset, ToolCalibration, TOOL_CALIBRATION_POSES};

use armtraj_geom::GeomError;
use thiserror::Error;

/// Errors that can occur during calibration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Wrong number of inputs or an out-of-range parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Inputs do not determine a unique answer.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The solver hit its iteration limit.
    #[error("solver did not converge after {iterations} iterations")]
    NoConvergence {
        /// Iterations performed.
        iterations: usize,
    },
}

impl From<GeomError> for CalibrationError {
    fn from(err: GeomError) -> Self {
        match err {
            GeomError::DegenerateGeometry(msg) => CalibrationError::DegenerateGeometry(msg),
            GeomError::InvalidArgument(msg) => CalibrationError::InvalidArgument(msg),
        }
    }
}

/// Result type for calibration operations.
pub type Result<T> = std::result::Result<T, CalibrationError>;

/// Round `value` to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
