//! Trajectory build parameters.

use armtraj_geom::SplineKind;
use serde::{Deserialize, Serialize};

use crate::{Result, TrajectoryError};

/// Parameters governing sampling density and corner blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Samples per primitive body and per blend transition.
    pub sample_count: usize,
    /// Spline family used for corner transitions.
    pub spline: SplineKind,
    /// Bisector offset factor for line-to-line corners.
    pub line_bisector_multiplier: f64,
    /// Bisector offset factor for corners touching an arc.
    pub arc_bisector_multiplier: f64,
    /// Smallest swept angle (degrees) accepted for an arc.
    pub min_arc_angle_degrees: f64,
    /// Reject blend distances longer than the primitive they trim.
    pub strict_blend_distance: bool,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        Self {
            sample_count: 25,
            spline: SplineKind::CatmullRom,
            line_bisector_multiplier: 0.3,
            arc_bisector_multiplier: 0.33,
            min_arc_angle_degrees: crate::MIN_ARC_ANGLE_DEGREES,
            strict_blend_distance: false,
        }
    }
}

impl TrajectorySettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.sample_count < 2 {
            return Err(TrajectoryError::InvalidArgument(
                "sample_count must be at least 2".into(),
            ));
        }
        for (name, value) in [
            ("line_bisector_multiplier", self.line_bisector_multiplier),
            ("arc_bisector_multiplier", self.arc_bisector_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrajectoryError::InvalidArgument(format!(
                    "{name} must be positive"
                )));
            }
        }
        if !(0.0..360.0).contains(&self.min_arc_angle_degrees) {
            return Err(TrajectoryError::InvalidArgument(
                "min_arc_angle_degrees must be in [0, 360)".into(),
            ));
        }
        Ok(())
    }
}
