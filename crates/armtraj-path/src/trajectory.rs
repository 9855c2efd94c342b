//! Trajectory assembly.

use armtraj_geom::blend_spline;
use armtraj_math::{Pose, Tolerance};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::blend::{blend_corner, check_blend_distance, Primitive, Station};
use crate::chain::{Motion, PoseChain};
use crate::primitive::{generate_arc, generate_line_points};
use crate::{Result, TrajectoryError, TrajectorySettings};

/// An ordered sequence of fully resolved poses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<Pose>,
}

impl Trajectory {
    /// Empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trajectory over the given poses, in order.
    pub fn from_points(points: Vec<Pose>) -> Self {
        Self { points }
    }

    /// The poses in motion order.
    pub fn points(&self) -> &[Pose] {
        &self.points
    }

    /// Number of poses.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the trajectory has no poses.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First pose.
    pub fn first(&self) -> Option<&Pose> {
        self.points.first()
    }

    /// Pose the robot occupies after executing the trajectory.
    pub fn end(&self) -> Option<&Pose> {
        self.points.last()
    }

    /// Iterate over the poses.
    pub fn iter(&self) -> std::slice::Iter<'_, Pose> {
        self.points.iter()
    }

    /// Take the poses.
    pub fn into_points(self) -> Vec<Pose> {
        self.points
    }

    /// Total path length through all positions (mm).
    pub fn path_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Append a segment, skipping poses that repeat the current last pose.
    pub fn extend_path(&mut self, segment: impl IntoIterator<Item = Pose>) {
        let tol = Tolerance::DEFAULT;
        for pose in segment {
            if self.points.last().is_some_and(|last| tol.poses_equal(last, &pose)) {
                continue;
            }
            self.points.push(pose);
        }
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Pose;
    type IntoIter = std::slice::Iter<'a, Pose>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Straight-line trajectory of `sample_count` poses from `start` to `end`.
pub fn build_line_trajectory(start: &Pose, end: &Pose, sample_count: usize) -> Result<Trajectory> {
    generate_line_points(start, end, sample_count).map(Trajectory::from_points)
}

/// Arc trajectory of `sample_count` poses from `p1` through `p2` to `p3`,
/// or from `p1` over an explicit `arc_angle_degrees`.
pub fn build_arc_trajectory(
    p1: &Pose,
    p2: &Pose,
    p3: &Pose,
    sample_count: usize,
    arc_angle_degrees: Option<f64>,
) -> Result<Trajectory> {
    let samples = generate_arc(p1, p2, p3, sample_count, None, arc_angle_degrees)?;
    Ok(Trajectory::from_points(samples.points))
}

/// Resolve the blend chain starting at `head` and build the blended trajectory.
///
/// A line head moves from `start`, which is then required. An arc head
/// begins at its first waypoint; a given `start` must coincide with it.
/// Every primitive body and every corner transition is sampled with
/// `settings.sample_count` poses, and poses shared at junctions appear once.
pub fn resolve_and_blend(
    chain: &PoseChain,
    start: Option<Pose>,
    head: Motion,
    settings: &TrajectorySettings,
) -> Result<Trajectory> {
    settings.validate()?;
    let motions = chain.resolve(head)?;
    let corners = chain.corners_between(&motions)?;

    let mut cursor = head_pose(chain, head, start)?;
    let mut primitives = Vec::with_capacity(motions.len());
    for motion in &motions {
        let primitive = Primitive::from_motion(chain, motion, &cursor)?;
        if let Primitive::Arc(path) = &primitive {
            if path.sweep_degrees() < settings.min_arc_angle_degrees {
                return Err(TrajectoryError::InvalidArgument(format!(
                    "arc sweeps {:.3}°, below the {}° minimum",
                    path.sweep_degrees(),
                    settings.min_arc_angle_degrees
                )));
            }
        }
        cursor = primitive.end_station().pose;
        primitives.push(primitive);
    }

    let n = settings.sample_count;
    let mut trajectory = Trajectory::new();
    let mut entry = primitives[0].start_station();
    for (i, corner) in corners.iter().enumerate() {
        let (incoming, outgoing) = (&primitives[i], &primitives[i + 1]);
        let outgoing_distance = chain.get(corner.outgoing.terminal())?.blend_distance;
        let transition = blend_corner(corner, incoming, outgoing, outgoing_distance, settings)?;
        push_body(&mut trajectory, incoming, &entry, &transition.exit, settings)?;
        if transition.controls.len() >= 2 {
            let spline = blend_spline(settings.spline, &transition.controls)?;
            trajectory.extend_path(spline.sample(n));
        }
        entry = transition.entry;
    }
    let last = &primitives[primitives.len() - 1];
    push_body(&mut trajectory, last, &entry, &last.end_station(), settings)?;

    debug!(
        motions = motions.len(),
        corners = corners.len(),
        points = trajectory.len(),
        "built blended trajectory"
    );
    Ok(trajectory)
}

fn head_pose(chain: &PoseChain, head: Motion, start: Option<Pose>) -> Result<Pose> {
    match (head, start) {
        (Motion::Lin(_), Some(start)) => Ok(start),
        (Motion::Lin(_), None) => Err(TrajectoryError::InvalidArgument(
            "a line head needs a start pose".into(),
        )),
        (Motion::Circ([first, _, _]), start) => {
            let arc_start = chain.pose(first)?;
            match start {
                Some(s) if !Tolerance::DEFAULT.points_equal(&s.position(), &arc_start.position()) => {
                    Err(TrajectoryError::InvalidArgument(format!(
                        "start pose is {:.3} mm away from the arc start",
                        s.distance_to(&arc_start)
                    )))
                }
                _ => Ok(arc_start),
            }
        }
    }
}

fn push_body(
    trajectory: &mut Trajectory,
    primitive: &Primitive,
    from: &Station,
    to: &Station,
    settings: &TrajectorySettings,
) -> Result<()> {
    check_blend_distance(
        primitive.length() - to.offset,
        primitive.length() - from.offset,
        "motion between two blends",
        settings,
    )?;
    let samples = primitive.sample(from, to, settings.sample_count)?;
    trace!(count = samples.len(), "primitive body");
    trajectory.extend_path(samples);
    Ok(())
}
