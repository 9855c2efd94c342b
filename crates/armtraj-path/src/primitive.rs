//! Raw line and arc sample generation.

use armtraj_geom::{Arc3d, Curve3d};
use armtraj_math::{Pose, Vec3};
use tracing::trace;

use crate::{Result, TrajectoryError};

/// Smallest explicit arc angle (degrees) accepted by [`generate_arc`].
pub const MIN_ARC_ANGLE_DEGREES: f64 = 18.0;

/// `count` poses uniformly spaced from `start` to `end`, both included.
pub fn generate_line_points(start: &Pose, end: &Pose, count: usize) -> Result<Vec<Pose>> {
    if count < 2 {
        return Err(TrajectoryError::InvalidArgument(format!(
            "a line needs at least 2 samples, got {count}"
        )));
    }
    let last = (count - 1) as f64;
    let points: Vec<Pose> = (0..count)
        .map(|i| start.lerp(end, i as f64 / last))
        .collect();
    trace!(count, "sampled line");
    Ok(points)
}

/// How orientation evolves along an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrientationRamp {
    /// Straight from the start orientation to the end orientation.
    Linear,
    /// Start to middle over the first half of the sweep, middle to end over the second.
    ThroughMid,
}

/// A circular arc carrying pose orientation along its sweep.
#[derive(Debug, Clone)]
pub struct ArcPath {
    /// Underlying circular geometry.
    pub arc: Arc3d,
    start: Pose,
    mid: Pose,
    end: Pose,
    ramp: OrientationRamp,
}

impl ArcPath {
    /// Arc from `start` through `mid` to `end`.
    ///
    /// With an explicit `arc_angle_degrees` the arc starts at `start` and sweeps
    /// that angle about the circle through all three poses, and orientation ramps
    /// linearly from `start` to `end`. Otherwise the sweep runs from `start` to
    /// `end` on the side containing `mid`, and orientation passes through
    /// `mid`'s orientation at the half-sweep.
    pub fn new(start: &Pose, mid: &Pose, end: &Pose, arc_angle_degrees: Option<f64>) -> Result<Self> {
        let (p1, p2, p3) = (start.position(), mid.position(), end.position());
        let (arc, ramp) = match arc_angle_degrees {
            Some(degrees) => {
                if !degrees.is_finite() || degrees <= 0.0 {
                    return Err(TrajectoryError::InvalidArgument(format!(
                        "arc angle must be positive, got {degrees}"
                    )));
                }
                (
                    Arc3d::with_sweep_degrees(&p1, &p2, &p3, degrees)?,
                    OrientationRamp::Linear,
                )
            }
            None => (Arc3d::through_points(&p1, &p2, &p3)?, OrientationRamp::ThroughMid),
        };
        Ok(Self {
            arc,
            start: *start,
            mid: *mid,
            end: *end,
            ramp,
        })
    }

    /// Swept angle in degrees.
    pub fn sweep_degrees(&self) -> f64 {
        self.arc.sweep_degrees()
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.arc.length()
    }

    fn orientation_at(&self, fraction: f64) -> Vec3 {
        match self.ramp {
            OrientationRamp::Linear => self.start.lerp(&self.end, fraction).orientation(),
            OrientationRamp::ThroughMid if fraction <= 0.5 => {
                self.start.lerp(&self.mid, fraction * 2.0).orientation()
            }
            OrientationRamp::ThroughMid => self.mid.lerp(&self.end, fraction * 2.0 - 1.0).orientation(),
        }
    }

    /// Pose at `fraction` of the sweep (0 = start, 1 = end).
    pub fn pose_at_fraction(&self, fraction: f64) -> Pose {
        let position = self.arc.evaluate(fraction * self.arc.sweep);
        Pose::from_parts(position, self.orientation_at(fraction))
    }

    /// Pose at arc length `s` from the start.
    pub fn pose_at_length(&self, s: f64) -> Pose {
        self.pose_at_fraction(s / self.length())
    }

    /// Unit direction of travel at arc length `s` from the start.
    pub fn direction_at_length(&self, s: f64) -> Vec3 {
        self.arc.tangent(self.arc.parameter_at_length(s)).normalize()
    }

    /// Final pose of the sweep.
    pub fn end_pose(&self) -> Pose {
        self.pose_at_fraction(1.0)
    }

    /// `count` poses uniformly spaced in angle between two arc lengths.
    pub fn sample_between(&self, from: f64, to: f64, count: usize) -> Vec<Pose> {
        let length = self.length();
        let (f0, f1) = (from / length, to / length);
        let last = (count.max(2) - 1) as f64;
        (0..count)
            .map(|i| self.pose_at_fraction(f0 + (f1 - f0) * i as f64 / last))
            .collect()
    }
}

/// Output of [`generate_arc`].
#[derive(Debug, Clone)]
pub struct ArcSamples {
    /// Arc samples, truncated at `point_from_end` when a distance was given.
    pub points: Vec<Pose>,
    /// Pose at the requested distance before the arc end (or the last sample).
    pub point_from_end: Pose,
    /// Pose at the requested distance after the arc start (or the first sample).
    pub point_from_start: Pose,
}

/// Sample the arc through `start`, `mid` and `end`.
///
/// `count` samples are spaced uniformly over the swept angle. When `distance`
/// is given, the poses that far (in arc length) from each end are computed
/// and the sample list stops at the one measured from the end.
pub fn generate_arc(
    start: &Pose,
    mid: &Pose,
    end: &Pose,
    count: usize,
    distance: Option<f64>,
    arc_angle_degrees: Option<f64>,
) -> Result<ArcSamples> {
    if count < 2 {
        return Err(TrajectoryError::InvalidArgument(format!(
            "an arc needs at least 2 samples, got {count}"
        )));
    }
    if let Some(degrees) = arc_angle_degrees {
        if degrees < MIN_ARC_ANGLE_DEGREES {
            return Err(TrajectoryError::InvalidArgument(format!(
                "arc angle {degrees}° is below the {MIN_ARC_ANGLE_DEGREES}° minimum"
            )));
        }
    }
    let path = ArcPath::new(start, mid, end, arc_angle_degrees)?;
    let length = path.length();
    let last = (count - 1) as f64;
    let fractions = (0..count).map(|i| i as f64 / last);

    let samples = match distance {
        None => {
            let points: Vec<Pose> = fractions.map(|f| path.pose_at_fraction(f)).collect();
            ArcSamples {
                point_from_end: points[count - 1],
                point_from_start: points[0],
                points,
            }
        }
        Some(d) if d < 0.0 || !d.is_finite() => {
            return Err(TrajectoryError::InvalidArgument(format!(
                "arc distance must be non-negative, got {d}"
            )));
        }
        Some(d) => {
            let end_fraction = (length - d) / length;
            let point_from_end = path.pose_at_length(length - d);
            let mut points: Vec<Pose> = fractions
                .take_while(|f| *f < end_fraction)
                .map(|f| path.pose_at_fraction(f))
                .collect();
            points.push(point_from_end);
            ArcSamples {
                points,
                point_from_end,
                point_from_start: path.pose_at_length(d),
            }
        }
    };
    trace!(
        count = samples.points.len(),
        sweep = path.sweep_degrees(),
        "sampled arc"
    );
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armtraj_math::Point3;

    fn half_circle() -> (Pose, Pose, Pose) {
        (
            Pose::new(100.0, -100.0, 67.117, 0.0, 0.0, 0.0),
            Pose::new(200.0, 0.0, 67.117, 10.0, 0.0, 40.0),
            Pose::new(100.0, 100.0, 67.117, 0.0, 0.0, 20.0),
        )
    }

    #[test]
    fn test_line_points_even_spacing() {
        let pts = generate_line_points(&Pose::at(0.0, 0.0, 0.0), &Pose::at(100.0, 0.0, 0.0), 5).unwrap();
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn test_line_needs_two_samples() {
        let p = Pose::at(0.0, 0.0, 0.0);
        assert!(matches!(
            generate_line_points(&p, &p, 1),
            Err(TrajectoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_arc_samples_lie_on_circle() {
        let (a, b, c) = half_circle();
        let samples = generate_arc(&a, &b, &c, 20, None, None).unwrap();
        assert_eq!(samples.points.len(), 20);
        let center = Point3::new(100.0, 0.0, 67.117);
        for p in &samples.points {
            assert!(((p.position() - center).norm() - 100.0).abs() < 1e-9);
        }
        assert!(samples.point_from_start.distance_to(&a) < 1e-9);
        assert!(samples.point_from_end.distance_to(&c) < 1e-9);
    }

    #[test]
    fn test_derived_arc_orientation_passes_through_mid() {
        let (a, b, c) = half_circle();
        let path = ArcPath::new(&a, &b, &c, None).unwrap();
        let mid = path.pose_at_fraction(0.5);
        assert!(mid.distance_to(&b) < 1e-9);
        assert!((mid.orientation() - b.orientation()).norm() < 1e-12);
        let quarter = path.pose_at_fraction(0.25);
        assert!((quarter.c - 20.0).abs() < 1e-12);
        let three_quarter = path.pose_at_fraction(0.75);
        assert!((three_quarter.c - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_angle_ramps_linearly() {
        let (a, b, c) = half_circle();
        let samples = generate_arc(&a, &b, &c, 3, None, Some(90.0)).unwrap();
        let last = samples.points[2];
        assert_relative_eq!(last.position(), Point3::new(200.0, 0.0, 67.117), epsilon = 1e-9);
        assert!((samples.points[1].c - 10.0).abs() < 1e-12);
        assert!((last.c - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_explicit_angle_rejected() {
        let (a, b, c) = half_circle();
        assert!(matches!(
            generate_arc(&a, &b, &c, 10, None, Some(17.9)),
            Err(TrajectoryError::InvalidArgument(_))
        ));
        assert!(generate_arc(&a, &b, &c, 10, None, Some(18.0)).is_ok());
    }

    #[test]
    fn test_collinear_arc_is_degenerate() {
        let a = Pose::at(0.0, 0.0, 0.0);
        let b = Pose::at(1.0, 0.0, 0.0);
        let c = Pose::at(2.0, 0.0, 0.0);
        assert!(matches!(
            generate_arc(&a, &b, &c, 10, None, None),
            Err(TrajectoryError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_distance_truncates_at_point_from_end() {
        let (a, b, c) = half_circle();
        let d = 20.0;
        let samples = generate_arc(&a, &b, &c, 25, Some(d), None).unwrap();
        let length = 100.0 * std::f64::consts::PI;
        let last = samples.points.last().unwrap();
        assert_eq!(*last, samples.point_from_end);
        assert!(samples.points.len() < 25);

        // Chord from the trimmed point to the arc end subtends d / r radians.
        let chord = 2.0 * 100.0 * (d / 200.0).sin();
        assert!((samples.point_from_end.distance_to(&c) - chord).abs() < 1e-9);
        assert!((samples.point_from_start.distance_to(&a) - chord).abs() < 1e-9);

        let path = ArcPath::new(&a, &b, &c, None).unwrap();
        assert!((path.length() - length).abs() < 1e-9);
    }

    #[test]
    fn test_negative_distance_rejected() {
        let (a, b, c) = half_circle();
        assert!(generate_arc(&a, &b, &c, 10, Some(-1.0), None).is_err());
    }
}
