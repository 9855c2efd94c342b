//! Six-channel Cartesian pose.

use serde::{Deserialize, Serialize};

use crate::{Point3, Vec3, Vec6};

/// A tool pose: position in millimeters and orientation as the
/// controller's three sequential rotation angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X position (mm).
    pub x: f64,
    /// Y position (mm).
    pub y: f64,
    /// Z position (mm).
    pub z: f64,
    /// Rotation about X (degrees).
    #[serde(default)]
    pub a: f64,
    /// Rotation about Y (degrees).
    #[serde(default)]
    pub b: f64,
    /// Rotation about Z (degrees).
    #[serde(default)]
    pub c: f64,
}

impl Pose {
    /// Create a pose from all six channels.
    pub const fn new(x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) -> Self {
        Self { x, y, z, a, b, c }
    }

    /// Create a pose at a position with zero orientation.
    pub const fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 0.0, 0.0, 0.0)
    }

    /// Create a pose from a position and an `(a, b, c)` orientation vector.
    pub fn from_parts(position: Point3, orientation: Vec3) -> Self {
        Self::new(
            position.x,
            position.y,
            position.z,
            orientation.x,
            orientation.y,
            orientation.z,
        )
    }

    /// Position channels as a point.
    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// Orientation channels as an `(a, b, c)` vector.
    pub fn orientation(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// All channels as `[x, y, z, a, b, c]`.
    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.a, self.b, self.c]
    }

    /// Build a pose from `[x, y, z, a, b, c]`.
    pub fn from_array(v: [f64; 6]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    /// All channels as a 6-vector.
    pub fn to_vector(&self) -> Vec6 {
        Vec6::from_row_slice(&self.to_array())
    }

    /// Build a pose from a 6-vector.
    pub fn from_vector(v: &Vec6) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    /// Channel-wise linear interpolation; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: &Pose, t: f64) -> Self {
        Self::from_vector(&(self.to_vector() + (other.to_vector() - self.to_vector()) * t))
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (other.position() - self.position()).norm()
    }
}

impl From<[f64; 6]> for Pose {
    fn from(v: [f64; 6]) -> Self {
        Self::from_array(v)
    }
}

impl From<Point3> for Pose {
    fn from(p: Point3) -> Self {
        Self::at(p.x, p.y, p.z)
    }
}
