//! Three-point circle fitting.

use armtraj_math::{Dir3, Point3};
use nalgebra::Matrix3x2;

use crate::{GeomError, Result};

/// Relative threshold on `|v1 x v2| / (|v1| |v2|)` below which three
/// points are treated as collinear.
const COLLINEAR_EPS: f64 = 1e-12;

/// A circle in 3D space recovered from three points on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    /// Center of the circle.
    pub center: Point3,
    /// Radius, measured from the center to the first input point.
    pub radius: f64,
    /// Unit normal of the circle plane, `(p2 - p1) x (p3 - p1)` normalized.
    pub normal: Dir3,
}

/// Fit the circle through `p1`, `p2` and `p3`.
///
/// The center is the intersection of the perpendicular bisectors of the
/// chords `p1p2` and `p1p3`, solved as a 3x2 least-squares system in the
/// two bisector parameters. Collinear or coincident points have no
/// circle and fail with [`GeomError::DegenerateGeometry`].
pub fn circle_through_three_points(p1: &Point3, p2: &Point3, p3: &Point3) -> Result<CircleFit> {
    let v1 = p2 - p1;
    let v2 = p3 - p1;
    let cross = v1.cross(&v2);
    let scale = v1.norm() * v2.norm();
    if scale == 0.0 || cross.norm() <= COLLINEAR_EPS * scale {
        return Err(GeomError::DegenerateGeometry(format!(
            "points ({:.3}, {:.3}, {:.3}), ({:.3}, {:.3}, {:.3}), ({:.3}, {:.3}, {:.3}) are collinear",
            p1.x, p1.y, p1.z, p2.x, p2.y, p2.z, p3.x, p3.y, p3.z
        )));
    }
    let normal = Dir3::new_normalize(cross);

    let mid12 = p1 + v1 * 0.5;
    let mid13 = p1 + v2 * 0.5;
    let perp1 = v1.cross(normal.as_ref());
    let perp2 = v2.cross(normal.as_ref());

    // mid12 + t * perp1 = mid13 + s * perp2
    let a = Matrix3x2::from_columns(&[perp1, -perp2]);
    let rhs = mid13 - mid12;
    let ata_inv = (a.transpose() * a).try_inverse().ok_or_else(|| {
        GeomError::DegenerateGeometry("chord bisectors do not intersect".into())
    })?;
    let params = ata_inv * (a.transpose() * rhs);

    let center = mid12 + perp1 * params[0];
    Ok(CircleFit {
        center,
        radius: (p1 - center).norm(),
        normal,
    })
}
