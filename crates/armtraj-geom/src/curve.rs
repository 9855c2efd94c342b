//! Parametric curves traced by trajectory primitives.

use std::f64::consts::TAU;

use armtraj_math::{Dir3, Point3, Vec3};

use crate::{circle_through_three_points, CircleFit, GeomError, Result};

/// A 3D parametric curve.
pub trait Curve3d: Send + Sync + std::fmt::Debug {
    /// Evaluate the curve at parameter `t` to get a 3D point.
    fn evaluate(&self, t: f64) -> Point3;

    /// Tangent vector at parameter `t`.
    fn tangent(&self, t: f64) -> Vec3;

    /// Parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Total arc length over the domain.
    fn length(&self) -> f64;

    /// Parameter reached after travelling `s` along the curve from `t_min`.
    fn parameter_at_length(&self, s: f64) -> f64;
}

/// A straight segment from `origin` to `origin + direction`, over `t ∈ [0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line3d {
    /// Start point.
    pub origin: Point3,
    /// Segment vector; its length is the segment length.
    pub direction: Vec3,
}

impl Line3d {
    /// Segment between two points.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self {
            origin: start,
            direction: end - start,
        }
    }
}

impl Curve3d for Line3d {
    fn evaluate(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    fn tangent(&self, _t: f64) -> Vec3 {
        self.direction
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn length(&self) -> f64 {
        self.direction.norm()
    }

    fn parameter_at_length(&self, s: f64) -> f64 {
        let len = self.length();
        if len == 0.0 {
            0.0
        } else {
            s / len
        }
    }
}

/// A circular arc swept counter-clockwise about `normal`, parameterized by
/// angle `t ∈ [0, sweep]` radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc3d {
    /// Center of the supporting circle.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
    /// Direction from the center to the arc start (t = 0).
    pub x_dir: Dir3,
    /// In-plane direction a quarter turn ahead of `x_dir`.
    pub y_dir: Dir3,
    /// Normal to the arc plane; the sweep is right-handed about it.
    pub normal: Dir3,
    /// Swept angle in radians.
    pub sweep: f64,
}

impl Arc3d {
    /// Arc on a fitted circle starting at `start` and sweeping `sweep` radians.
    pub fn from_fit(fit: &CircleFit, start: &Point3, sweep: f64) -> Result<Self> {
        let radial = start - fit.center;
        if radial.norm() == 0.0 {
            return Err(GeomError::DegenerateGeometry(
                "arc start coincides with the circle center".into(),
            ));
        }
        let x_dir = Dir3::new_normalize(radial);
        let y_dir = Dir3::new_normalize(fit.normal.as_ref().cross(x_dir.as_ref()));
        Ok(Self {
            center: fit.center,
            radius: fit.radius,
            x_dir,
            y_dir,
            normal: fit.normal,
            sweep,
        })
    }

    /// Arc from `p1` through `p2` to `p3`.
    ///
    /// The sweep is measured from `p1` to `p3` about the fitted normal, which
    /// orients the circle so that `p2` lies on the swept side. The result is
    /// in `(0, 2π)`, so arcs longer than a half turn are preserved.
    pub fn through_points(p1: &Point3, p2: &Point3, p3: &Point3) -> Result<Self> {
        let fit = circle_through_three_points(p1, p2, p3)?;
        let sweep = swept_angle(&fit, p1, p3);
        Self::from_fit(&fit, p1, sweep)
    }

    /// Arc from `p1` on the circle through all three points, sweeping an
    /// explicit angle in degrees.
    pub fn with_sweep_degrees(p1: &Point3, p2: &Point3, p3: &Point3, degrees: f64) -> Result<Self> {
        let fit = circle_through_three_points(p1, p2, p3)?;
        Self::from_fit(&fit, p1, degrees.to_radians())
    }

    /// Swept angle in degrees.
    pub fn sweep_degrees(&self) -> f64 {
        self.sweep.to_degrees()
    }

    /// Point on the arc at arc length `s` from its start.
    pub fn point_at_length(&self, s: f64) -> Point3 {
        self.evaluate(self.parameter_at_length(s))
    }
}

/// Angle from `from` to `to` about the circle normal, mapped into `(0, 2π]`.
fn swept_angle(fit: &CircleFit, from: &Point3, to: &Point3) -> f64 {
    let u = from - fit.center;
    let v = to - fit.center;
    let angle = fit.normal.as_ref().dot(&u.cross(&v)).atan2(u.dot(&v));
    if angle <= 0.0 {
        angle + TAU
    } else {
        angle
    }
}

impl Curve3d for Arc3d {
    fn evaluate(&self, t: f64) -> Point3 {
        let (sin_t, cos_t) = t.sin_cos();
        self.center + self.radius * (cos_t * self.x_dir.as_ref() + sin_t * self.y_dir.as_ref())
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let (sin_t, cos_t) = t.sin_cos();
        self.radius * (-sin_t * self.x_dir.as_ref() + cos_t * self.y_dir.as_ref())
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.sweep)
    }

    fn length(&self) -> f64 {
        self.radius * self.sweep
    }

    fn parameter_at_length(&self, s: f64) -> f64 {
        s / self.radius
    }
}
