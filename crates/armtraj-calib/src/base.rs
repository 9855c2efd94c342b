//! Base-frame calibration from three probed points.

use armtraj_geom::{angle_between_vectors, AngleSign, Axis};
use armtraj_math::{Point3, Pose};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{round_to, CalibrationError, Result};

/// Number of points required by [`calibrate_base_frame`].
pub const BASE_CALIBRATION_POINTS: usize = 3;

/// Distance of the auxiliary point on the +X ray used to measure yaw (mm).
const YAW_REFERENCE_REACH: f64 = 10_000.0;

/// A work frame: origin position and `a, b, c` rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseFrame {
    /// Origin X (mm).
    pub x: f64,
    /// Origin Y (mm).
    pub y: f64,
    /// Origin Z (mm).
    pub z: f64,
    /// Yaw of the frame's X axis in the horizontal plane (degrees).
    pub a: f64,
    /// Elevation of the X-axis point above the origin's horizontal plane (degrees).
    pub b: f64,
    /// Elevation of the Y-axis point above the origin's horizontal plane (degrees).
    pub c: f64,
}

impl BaseFrame {
    /// Frame origin.
    pub fn origin(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// The frame as a pose.
    pub fn as_pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.z, self.a, self.b, self.c)
    }
}

/// Derive a base frame from `[origin, x_point, y_point]`.
///
/// `b` and `c` are the signed angles between each axis point and its
/// projection onto the origin's horizontal plane, negative when the point is
/// below the origin. `a` is the signed angle, in that plane, from the +X
/// direction to the projected X point, negative toward -Y. Angles are rounded
/// to 6 decimals.
///
/// Yaw is measured at the probed origin and signed relative to its Y, so it
/// does not change when the frame is translated. Frames recorded by clients
/// that measured yaw at the world origin will differ whenever the probed
/// origin is off the world X axis.
pub fn calibrate_base_frame(points: &[Point3]) -> Result<BaseFrame> {
    let [origin, x_point, y_point] = points else {
        return Err(CalibrationError::InvalidArgument(format!(
            "base calibration needs exactly {BASE_CALIBRATION_POINTS} points, got {}",
            points.len()
        )));
    };

    let level = |p: &Point3| Point3::new(p.x, p.y, origin.z);
    let elevation = AngleSign::BelowVertex(Axis::Z);

    let b = angle_between_vectors(&level(x_point), origin, x_point, elevation)?;
    let c = angle_between_vectors(&level(y_point), origin, y_point, elevation)?;

    let x_reference = Point3::new(origin.x + YAW_REFERENCE_REACH, origin.y, origin.z);
    let a = angle_between_vectors(
        &x_reference,
        origin,
        &level(x_point),
        AngleSign::BelowVertex(Axis::Y),
    )?;

    let frame = BaseFrame {
        x: origin.x,
        y: origin.y,
        z: origin.z,
        a: round_to(a, 6),
        b: round_to(b, 6),
        c: round_to(c, 6),
    };
    debug!(?frame, "base frame derived");
    Ok(frame)
}
