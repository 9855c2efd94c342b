#![warn(missing_docs)]

//! Geometry kernel for the armtraj trajectory engine.
//!
//! Provides the primitives every trajectory builder leans on:
//! vector normalization with an explicit zero-vector policy, three-point
//! circle fitting, distance/percentage interpolation along segments,
//! corner bisector points, signed angles between rays, parametric curves
//! ([`Line3d`], [`Arc3d`]) and the splines used to synthesize corner blends.

mod circle;
mod curve;
pub mod spline;

pub use circle::{circle_through_three_points, CircleFit};
pub use curve::{Arc3d, Curve3d, Line3d};
pub use spline::{blend_spline, CatmullRom, NaturalCubic, PoseSpline, SplineKind};

use armtraj_math::{Point3, Pose, Tolerance, Vec3};
use thiserror::Error;

/// Errors raised by geometric constructions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Input points are collinear, coincident, or otherwise leave a
    /// construction undefined.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A construction was called with an argument outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;

// =============================================================================
// Vectors
// =============================================================================

/// Unit vector along `v`, or `v` itself when it has zero length.
///
/// Callers that need a direction must guard against zero input.
pub fn normalize(v: &Vec3) -> Vec3 {
    let n = v.norm();
    if n == 0.0 {
        *v
    } else {
        v / n
    }
}

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Component of `p` along this axis.
    pub fn component(self, p: &Point3) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }
}

/// How [`angle_between_vectors`] signs its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleSign {
    /// Always return the unsigned angle in `[0, 180]`.
    Unsigned,
    /// Negative when the far point lies below the vertex along the axis.
    BelowVertex(Axis),
}

/// Angle in degrees at `vertex` between the rays toward `a` and `c`.
///
/// The cosine is clamped to `[-1, 1]` before `acos`, so nearly parallel
/// rays never produce NaN. A zero-length ray has no direction and fails
/// with [`GeomError::DegenerateGeometry`].
pub fn angle_between_vectors(
    a: &Point3,
    vertex: &Point3,
    c: &Point3,
    sign: AngleSign,
) -> Result<f64> {
    let ba = a - vertex;
    let bc = c - vertex;
    let denom = ba.norm() * bc.norm();
    if denom == 0.0 {
        return Err(GeomError::DegenerateGeometry(format!(
            "angle at ({:.3}, {:.3}, {:.3}) has a zero-length ray",
            vertex.x, vertex.y, vertex.z
        )));
    }
    let cos_theta = (ba.dot(&bc) / denom).clamp(-1.0, 1.0);
    let angle = cos_theta.acos().to_degrees();
    Ok(match sign {
        AngleSign::BelowVertex(axis) if axis.component(c) < axis.component(vertex) => -angle,
        _ => angle,
    })
}

// =============================================================================
// Segments
// =============================================================================

/// Pose `percent` of the way from `start` to `end`, all six channels.
pub fn point_between(start: &Pose, end: &Pose, percent: f64) -> Pose {
    start.lerp(end, percent / 100.0)
}

/// Pose exactly `distance` from `start` along the line toward `end`.
///
/// Orientation advances by the same fraction of the segment.
pub fn point_at_distance_on_segment(start: &Pose, end: &Pose, distance: f64) -> Result<Pose> {
    let length = start.distance_to(end);
    if Tolerance::DEFAULT.is_zero(length) {
        return Err(GeomError::DegenerateGeometry(format!(
            "segment starting at ({:.3}, {:.3}, {:.3}) has zero length",
            start.x, start.y, start.z
        )));
    }
    Ok(start.lerp(end, distance / length))
}

/// The two points `distance` away from `corner` toward `a` and toward `b`.
pub fn points_on_segments(
    a: &Point3,
    b: &Point3,
    corner: &Point3,
    distance: f64,
) -> (Point3, Point3) {
    (
        corner + normalize(&(a - corner)) * distance,
        corner + normalize(&(b - corner)) * distance,
    )
}

/// Point on the bisector of the angle `a`-`corner`-`b`, at
/// `distance * multiplier` from the corner.
pub fn bisector_point(
    a: &Point3,
    b: &Point3,
    corner: &Point3,
    distance: f64,
    multiplier: f64,
) -> Point3 {
    let to_a = normalize(&(a - corner));
    let to_b = normalize(&(b - corner));
    let bisector = normalize(&(to_a + to_b));
    corner + bisector * (distance * multiplier)
}
