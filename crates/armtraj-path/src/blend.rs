//! Corner blending.
//!
//! Each corner trims the incoming primitive `d` before its end and the
//! outgoing primitive `d` after its start, then bridges the gap with a
//! spline through a handful of control poses. The control layout depends on
//! the corner topology; orientation at interior controls is interpolated
//! between the two trim poses.

use armtraj_geom::{bisector_point, normalize, point_at_distance_on_segment, point_between, Curve3d, Line3d};
use armtraj_math::{Point3, Pose, Tolerance, Vec3};
use tracing::{debug, warn};

use crate::chain::{Corner, Motion, PoseChain};
use crate::primitive::{generate_line_points, ArcPath};
use crate::{Result, TrajectoryError, TrajectorySettings};

/// Fraction of the blend distance by which arc-to-arc handles are pulled
/// along the arc tangents.
const ARC_PULL_FRACTION: f64 = 1.0 / 3.0;

/// A pose on a primitive together with its arc-length offset from the start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Station {
    pub pose: Pose,
    pub offset: f64,
}

/// A straight motion between two poses.
#[derive(Debug, Clone)]
pub(crate) struct LineSegment {
    start: Pose,
    end: Pose,
    curve: Line3d,
}

impl LineSegment {
    fn new(start: Pose, end: Pose) -> Self {
        Self {
            start,
            end,
            curve: Line3d::from_points(start.position(), end.position()),
        }
    }

    fn direction(&self) -> Vec3 {
        normalize(&self.curve.tangent(0.0))
    }
}

/// A motion with its geometry resolved.
#[derive(Debug, Clone)]
pub(crate) enum Primitive {
    Line(LineSegment),
    Arc(ArcPath),
}

impl Primitive {
    /// Resolve `motion`; lines start at `cursor`, the pose reached so far.
    pub fn from_motion(chain: &PoseChain, motion: &Motion, cursor: &Pose) -> Result<Self> {
        match motion {
            Motion::Lin(id) => Ok(Primitive::Line(LineSegment::new(*cursor, chain.pose(*id)?))),
            Motion::Circ([a, b, c]) => {
                let start = chain.pose(*a)?;
                let span = chain.get(*c)?.arc_span_degrees;
                let path = ArcPath::new(&start, &chain.pose(*b)?, &chain.pose(*c)?, span)?;
                if !Tolerance::DEFAULT.points_equal(&cursor.position(), &start.position()) {
                    warn!(
                        gap = cursor.distance_to(&start),
                        "arc does not start at the current position"
                    );
                }
                Ok(Primitive::Arc(path))
            }
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Primitive::Line(line) => line.curve.length(),
            Primitive::Arc(path) => path.length(),
        }
    }

    pub fn start_station(&self) -> Station {
        let pose = match self {
            Primitive::Line(line) => line.start,
            Primitive::Arc(path) => path.pose_at_fraction(0.0),
        };
        Station { pose, offset: 0.0 }
    }

    pub fn end_station(&self) -> Station {
        let pose = match self {
            Primitive::Line(line) => line.end,
            Primitive::Arc(path) => path.end_pose(),
        };
        Station {
            pose,
            offset: self.length(),
        }
    }

    /// `count` poses from one station to another along this primitive.
    pub fn sample(&self, from: &Station, to: &Station, count: usize) -> Result<Vec<Pose>> {
        match self {
            Primitive::Line(_) => generate_line_points(&from.pose, &to.pose, count),
            Primitive::Arc(path) => Ok(path.sample_between(from.offset, to.offset, count)),
        }
    }
}

/// The replacement for one corner: where the incoming body stops, the
/// spline controls, and where the outgoing body resumes.
#[derive(Debug, Clone)]
pub(crate) struct Transition {
    pub exit: Station,
    pub controls: Vec<Pose>,
    pub entry: Station,
}

/// Flag a blend distance that does not fit on a primitive.
pub(crate) fn check_blend_distance(
    distance: f64,
    available: f64,
    what: &str,
    settings: &TrajectorySettings,
) -> Result<()> {
    if distance <= available + Tolerance::DEFAULT.linear {
        return Ok(());
    }
    if settings.strict_blend_distance {
        return Err(TrajectoryError::InvalidArgument(format!(
            "blend distance {distance:.3} exceeds the {available:.3} mm available on the {what}"
        )));
    }
    warn!(distance, available, what, "blend distance exceeds primitive length");
    Ok(())
}

/// Build the transition replacing `corner`.
///
/// `outgoing_distance` is the blend distance of the outgoing motion's own
/// terminal waypoint; only arc-to-arc corners trim the outgoing arc by it.
pub(crate) fn blend_corner(
    corner: &Corner,
    incoming: &Primitive,
    outgoing: &Primitive,
    outgoing_distance: f64,
    settings: &TrajectorySettings,
) -> Result<Transition> {
    let d = corner.distance;
    if !d.is_finite() || d < 0.0 {
        return Err(TrajectoryError::InvalidArgument(format!(
            "blend distance must be non-negative, got {d}"
        )));
    }
    if Tolerance::DEFAULT.is_zero(d) {
        debug!(kind = %corner.kind(), "sharp corner");
        return Ok(Transition {
            exit: incoming.end_station(),
            controls: Vec::new(),
            entry: outgoing.start_station(),
        });
    }

    let outgoing_trim = match (incoming, outgoing) {
        (Primitive::Arc(_), Primitive::Arc(_)) => outgoing_distance,
        _ => d,
    };
    check_blend_distance(d, incoming.length(), "incoming motion", settings)?;
    check_blend_distance(outgoing_trim, outgoing.length(), "outgoing motion", settings)?;
    debug!(kind = %corner.kind(), distance = d, "blending corner");

    let line_mult = settings.line_bisector_multiplier;
    let arc_mult = settings.arc_bisector_multiplier;
    match (incoming, outgoing) {
        (Primitive::Line(a), Primitive::Line(b)) => line_line(a, b, d, line_mult),
        (Primitive::Line(a), Primitive::Arc(b)) => line_arc(a, b, d, arc_mult),
        (Primitive::Arc(a), Primitive::Line(b)) => arc_line(a, b, d, arc_mult),
        (Primitive::Arc(a), Primitive::Arc(b)) => Ok(arc_arc(a, b, d, outgoing_trim)),
    }
}

/// Midpoint control for corners touching an arc.
///
/// `u_in` and `u_out` are the unit directions leaving `corner` back along the
/// incoming motion and forward along the outgoing one. The control sits
/// `mult * d` along each of them, so tangent-continuous joins stay close to
/// the corner.
fn corner_midpoint(corner: &Point3, u_in: &Vec3, u_out: &Vec3, d: f64, mult: f64, from: &Pose, to: &Pose) -> Pose {
    let spread = (u_in + u_out).norm();
    let position = bisector_point(&(corner + u_in), &(corner + u_out), corner, d * spread, mult);
    Pose::from_parts(position, from.lerp(to, 0.5).orientation())
}

fn line_line(a: &LineSegment, b: &LineSegment, d: f64, mult: f64) -> Result<Transition> {
    let corner = a.end.position();
    let s = point_at_distance_on_segment(&a.end, &a.start, d)?;
    let e = point_at_distance_on_segment(&b.start, &b.end, d)?;
    let mid = Pose::from_parts(
        bisector_point(&e.position(), &s.position(), &corner, d, mult),
        s.lerp(&e, 0.5).orientation(),
    );
    Ok(Transition {
        exit: Station {
            pose: s,
            offset: a.curve.length() - d,
        },
        controls: vec![s, mid, e],
        entry: Station { pose: e, offset: d },
    })
}

fn line_arc(a: &LineSegment, b: &ArcPath, d: f64, mult: f64) -> Result<Transition> {
    let corner = a.end.position();
    let s = point_at_distance_on_segment(&a.end, &a.start, d)?;
    let e = b.pose_at_length(d);
    let mid = corner_midpoint(&corner, &-a.direction(), &b.direction_at_length(0.0), d, mult, &s, &e);
    Ok(Transition {
        exit: Station {
            pose: s,
            offset: a.curve.length() - d,
        },
        controls: vec![s, mid, e],
        entry: Station { pose: e, offset: d },
    })
}

fn arc_line(a: &ArcPath, b: &LineSegment, d: f64, mult: f64) -> Result<Transition> {
    let length = a.length();
    let corner = a.end_pose().position();
    let s = a.pose_at_length(length - d);
    let e = point_at_distance_on_segment(&b.start, &b.end, d)?;
    let mid = corner_midpoint(&corner, &-a.direction_at_length(length), &b.direction(), d, mult, &s, &e);
    Ok(Transition {
        exit: Station {
            pose: s,
            offset: length - d,
        },
        controls: vec![s, mid, e],
        entry: Station { pose: e, offset: d },
    })
}

fn arc_arc(a: &ArcPath, b: &ArcPath, d_in: f64, d_out: f64) -> Transition {
    let length = a.length();
    let e1 = a.pose_at_length(length - d_in);
    let s2 = b.pose_at_length(d_out);
    let t1 = a.direction_at_length(length);
    let t2 = b.direction_at_length(0.0);

    let pulled_in = Pose::from_parts(
        e1.position() + t1 * (d_in * ARC_PULL_FRACTION),
        e1.lerp(&s2, 0.25).orientation(),
    );
    let pulled_out = Pose::from_parts(
        s2.position() - t2 * (d_out * ARC_PULL_FRACTION),
        e1.lerp(&s2, 0.75).orientation(),
    );
    let mid = point_between(&pulled_in, &pulled_out, 50.0);
    Transition {
        exit: Station {
            pose: e1,
            offset: length - d_in,
        },
        controls: vec![e1, pulled_in, mid, pulled_out, s2],
        entry: Station {
            pose: s2,
            offset: d_out,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Motion, PoseChain};

    fn corner(chain: &PoseChain, incoming: Motion, outgoing: Motion) -> Corner {
        Corner {
            incoming,
            outgoing,
            distance: chain.get(incoming.terminal()).unwrap().blend_distance,
        }
    }

    #[test]
    fn test_line_line_controls() {
        let mut chain = PoseChain::new();
        let p = chain.insert(Pose::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        let q = chain.insert(Pose::new(100.0, 100.0, 0.0, 0.0, 0.0, 100.0));
        let start = Pose::at(0.0, 0.0, 0.0);
        let incoming = Primitive::from_motion(&chain, &Motion::Lin(p), &start).unwrap();
        let outgoing = Primitive::from_motion(&chain, &Motion::Lin(q), &chain.pose(p).unwrap()).unwrap();
        let c = corner(&chain, Motion::Lin(p), Motion::Lin(q));
        let t = blend_corner(&c, &incoming, &outgoing, 5.0, &TrajectorySettings::default()).unwrap();

        assert!((t.exit.pose.position() - Point3::new(95.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((t.entry.pose.position() - Point3::new(100.0, 5.0, 0.0)).norm() < 1e-12);
        assert!((t.entry.pose.c - 5.0).abs() < 1e-12);
        assert!((t.exit.offset - 95.0).abs() < 1e-12);

        let mid = t.controls[1];
        assert!((mid.distance_to(&chain.pose(p).unwrap()) - 1.5).abs() < 1e-12);
        assert!((mid.c - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_distance_is_sharp() {
        let mut chain = PoseChain::new();
        let p = chain.insert(Pose::at(10.0, 0.0, 0.0));
        let q = chain.insert(Pose::at(10.0, 10.0, 0.0));
        chain.set_blend(p, Motion::Lin(q), 0.0).unwrap();
        let start = Pose::at(0.0, 0.0, 0.0);
        let incoming = Primitive::from_motion(&chain, &Motion::Lin(p), &start).unwrap();
        let outgoing = Primitive::from_motion(&chain, &Motion::Lin(q), &chain.pose(p).unwrap()).unwrap();
        let c = corner(&chain, Motion::Lin(p), Motion::Lin(q));
        let t = blend_corner(&c, &incoming, &outgoing, 5.0, &TrajectorySettings::default()).unwrap();
        assert!(t.controls.is_empty());
        assert_eq!(t.exit.pose, chain.pose(p).unwrap());
        assert_eq!(t.entry.pose, chain.pose(p).unwrap());
    }

    #[test]
    fn test_strict_blend_distance() {
        let mut chain = PoseChain::new();
        let p = chain.insert(Pose::at(3.0, 0.0, 0.0));
        let q = chain.insert(Pose::at(3.0, 10.0, 0.0));
        let start = Pose::at(0.0, 0.0, 0.0);
        let incoming = Primitive::from_motion(&chain, &Motion::Lin(p), &start).unwrap();
        let outgoing = Primitive::from_motion(&chain, &Motion::Lin(q), &chain.pose(p).unwrap()).unwrap();
        let c = corner(&chain, Motion::Lin(p), Motion::Lin(q));

        let lenient = TrajectorySettings::default();
        assert!(blend_corner(&c, &incoming, &outgoing, 5.0, &lenient).is_ok());

        let strict = TrajectorySettings {
            strict_blend_distance: true,
            ..Default::default()
        };
        assert!(matches!(
            blend_corner(&c, &incoming, &outgoing, 5.0, &strict),
            Err(TrajectoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tangent_arc_join_runs_through_corner() {
        // Line along +x into a quarter circle whose start tangent is +x.
        let mut chain = PoseChain::new();
        let p = chain.insert(Pose::at(100.0, 0.0, 0.0));
        let a1 = chain.insert(Pose::at(100.0, 0.0, 0.0));
        let a2 = chain.insert(Pose::at(100.0 + 50.0 * std::f64::consts::FRAC_1_SQRT_2, 50.0 - 50.0 * std::f64::consts::FRAC_1_SQRT_2, 0.0));
        let a3 = chain.insert(Pose::at(150.0, 50.0, 0.0));
        let arc = Motion::Circ([a1, a2, a3]);
        let start = Pose::at(0.0, 0.0, 0.0);
        let incoming = Primitive::from_motion(&chain, &Motion::Lin(p), &start).unwrap();
        let outgoing = Primitive::from_motion(&chain, &arc, &chain.pose(p).unwrap()).unwrap();
        let c = corner(&chain, Motion::Lin(p), arc);
        let t = blend_corner(&c, &incoming, &outgoing, 5.0, &TrajectorySettings::default()).unwrap();
        assert!(t.controls[1].distance_to(&chain.pose(p).unwrap()) < 1e-9);
    }

    #[test]
    fn test_arc_arc_uses_both_distances() {
        let mut chain = PoseChain::new();
        let ids = [
            chain.insert(Pose::at(0.0, -100.0, 0.0)),
            chain.insert(Pose::at(70.710678, -70.710678, 0.0)),
            chain.insert(Pose::at(100.0, 0.0, 0.0)),
            chain.insert(Pose::at(150.0, 50.0, 0.0)),
            chain.insert(Pose::at(100.0, 100.0, 0.0)),
        ];
        let first = Motion::Circ([ids[0], ids[1], ids[2]]);
        let second = Motion::Circ([ids[2], ids[3], ids[4]]);
        chain.set_blend(ids[2], second, 5.0).unwrap();
        let start = chain.pose(ids[0]).unwrap();
        let incoming = Primitive::from_motion(&chain, &first, &start).unwrap();
        let outgoing = Primitive::from_motion(&chain, &second, &incoming.end_station().pose).unwrap();
        let c = corner(&chain, first, second);
        let t = blend_corner(&c, &incoming, &outgoing, 8.0, &TrajectorySettings::default()).unwrap();
        assert_eq!(t.controls.len(), 5);
        assert!((t.entry.offset - 8.0).abs() < 1e-12);
        assert!((t.exit.offset - (incoming.length() - 5.0)).abs() < 1e-9);
        let corner_point = Point3::new(100.0, 0.0, 0.0);
        for control in &t.controls {
            assert!((control.position() - corner_point).norm() > 1.0);
        }
    }
}
