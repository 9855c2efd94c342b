//! Waypoint arena and blend-chain resolution.
//!
//! Waypoints live in a [`PoseChain`] and are addressed by [`PoseId`]. Each
//! waypoint may name the motion that follows it (`blend_to`), forming a
//! singly-linked chain. Resolution walks the chain from a head motion and
//! yields the ordered motions; consecutive pairs are the corners to blend.

use std::collections::HashSet;
use std::fmt;

use armtraj_math::Pose;
use slotmap::{new_key_type, SlotMap};

use crate::{Result, TrajectoryError};

new_key_type! {
    /// Handle to a waypoint in a [`PoseChain`].
    pub struct PoseId;
}

/// Blend distance used when a waypoint does not set one (mm).
pub const DEFAULT_BLEND_DISTANCE: f64 = 5.0;

/// A motion toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// Straight line to the waypoint.
    Lin(PoseId),
    /// Circular arc from the first waypoint, through the second, to the third.
    Circ([PoseId; 3]),
}

impl Motion {
    /// Waypoint that ends this motion and carries its blend metadata.
    pub fn terminal(&self) -> PoseId {
        match self {
            Motion::Lin(id) => *id,
            Motion::Circ([_, _, end]) => *end,
        }
    }

    /// Every waypoint this motion references.
    pub fn waypoints(&self) -> &[PoseId] {
        match self {
            Motion::Lin(id) => std::slice::from_ref(id),
            Motion::Circ(ids) => ids,
        }
    }
}

/// A pose plus the metadata that links it to the next motion.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// The target pose.
    pub pose: Pose,
    /// Motion to blend into after reaching this waypoint.
    pub blend_to: Option<Motion>,
    /// How far before the corner the blend starts (mm).
    pub blend_distance: f64,
    /// Explicit swept angle when this waypoint ends an arc (degrees).
    pub arc_span_degrees: Option<f64>,
}

impl Waypoint {
    /// Unlinked waypoint at `pose` with the default blend distance.
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            blend_to: None,
            blend_distance: DEFAULT_BLEND_DISTANCE,
            arc_span_degrees: None,
        }
    }
}

/// The four corner topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerKind {
    /// Line into line.
    LineLine,
    /// Line into arc.
    LineArc,
    /// Arc into line.
    ArcLine,
    /// Arc into arc.
    ArcArc,
}

impl CornerKind {
    /// Topology of the corner between two motions.
    pub fn of(incoming: &Motion, outgoing: &Motion) -> Self {
        match (incoming, outgoing) {
            (Motion::Lin(_), Motion::Lin(_)) => CornerKind::LineLine,
            (Motion::Lin(_), Motion::Circ(_)) => CornerKind::LineArc,
            (Motion::Circ(_), Motion::Lin(_)) => CornerKind::ArcLine,
            (Motion::Circ(_), Motion::Circ(_)) => CornerKind::ArcArc,
        }
    }
}

impl fmt::Display for CornerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CornerKind::LineLine => "line-line",
            CornerKind::LineArc => "line-arc",
            CornerKind::ArcLine => "arc-line",
            CornerKind::ArcArc => "arc-arc",
        };
        f.write_str(name)
    }
}

/// A junction between two consecutive motions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Motion arriving at the corner.
    pub incoming: Motion,
    /// Motion leaving the corner.
    pub outgoing: Motion,
    /// Blend distance of the incoming motion's terminal waypoint.
    pub distance: f64,
}

impl Corner {
    /// Topology of this corner.
    pub fn kind(&self) -> CornerKind {
        CornerKind::of(&self.incoming, &self.outgoing)
    }
}

/// Arena of waypoints linked into blend chains.
#[derive(Debug, Clone, Default)]
pub struct PoseChain {
    waypoints: SlotMap<PoseId, Waypoint>,
}

impl PoseChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlinked waypoint at `pose`.
    pub fn insert(&mut self, pose: Pose) -> PoseId {
        self.waypoints.insert(Waypoint::new(pose))
    }

    /// Add a fully specified waypoint.
    pub fn insert_waypoint(&mut self, waypoint: Waypoint) -> PoseId {
        self.waypoints.insert(waypoint)
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the chain holds no waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Look up a waypoint.
    pub fn get(&self, id: PoseId) -> Result<&Waypoint> {
        self.waypoints
            .get(id)
            .ok_or(TrajectoryError::UnknownPose(id))
    }

    fn get_mut(&mut self, id: PoseId) -> Result<&mut Waypoint> {
        self.waypoints
            .get_mut(id)
            .ok_or(TrajectoryError::UnknownPose(id))
    }

    /// Pose of a waypoint.
    pub fn pose(&self, id: PoseId) -> Result<Pose> {
        Ok(self.get(id)?.pose)
    }

    /// Link `id` to the motion that follows it, blending `distance` mm before the corner.
    pub fn set_blend(&mut self, id: PoseId, next: Motion, distance: f64) -> Result<()> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(TrajectoryError::InvalidArgument(format!(
                "blend distance must be non-negative, got {distance}"
            )));
        }
        for target in next.waypoints() {
            self.get(*target)?;
        }
        let waypoint = self.get_mut(id)?;
        waypoint.blend_to = Some(next);
        waypoint.blend_distance = distance;
        Ok(())
    }

    /// Set the explicit sweep of an arc ending at `id`.
    pub fn set_arc_span(&mut self, id: PoseId, degrees: f64) -> Result<()> {
        if !degrees.is_finite() || degrees <= 0.0 {
            return Err(TrajectoryError::InvalidArgument(format!(
                "arc span must be positive, got {degrees}"
            )));
        }
        self.get_mut(id)?.arc_span_degrees = Some(degrees);
        Ok(())
    }

    /// Ordered motions starting at `head`, following `blend_to` links.
    ///
    /// Fails with [`TrajectoryError::CyclicChain`] when a terminal waypoint
    /// is reached twice and [`TrajectoryError::UnknownPose`] when a motion
    /// names a waypoint missing from the arena.
    pub fn resolve(&self, head: Motion) -> Result<Vec<Motion>> {
        let mut motions = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(head);
        while let Some(motion) = current {
            for id in motion.waypoints() {
                self.get(*id)?;
            }
            let terminal = motion.terminal();
            if !visited.insert(terminal) {
                return Err(TrajectoryError::CyclicChain(terminal));
            }
            motions.push(motion);
            current = self.get(terminal)?.blend_to;
        }
        Ok(motions)
    }

    /// Corners between consecutive motions of the chain starting at `head`.
    pub fn corners(&self, head: Motion) -> Result<Vec<Corner>> {
        let motions = self.resolve(head)?;
        self.corners_between(&motions)
    }

    /// Corners between consecutive entries of an already resolved motion list.
    pub fn corners_between(&self, motions: &[Motion]) -> Result<Vec<Corner>> {
        motions
            .windows(2)
            .map(|pair| {
                Ok(Corner {
                    incoming: pair[0],
                    outgoing: pair[1],
                    distance: self.get(pair[0].terminal())?.blend_distance,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (PoseChain, [PoseId; 4]) {
        let mut chain = PoseChain::new();
        let ids = [
            chain.insert(Pose::at(100.0, 0.0, 0.0)),
            chain.insert(Pose::at(100.0, 100.0, 0.0)),
            chain.insert(Pose::at(0.0, 100.0, 0.0)),
            chain.insert(Pose::at(0.0, 0.0, 0.0)),
        ];
        (chain, ids)
    }

    #[test]
    fn test_resolve_follows_links() {
        let (mut chain, ids) = square();
        chain.set_blend(ids[0], Motion::Lin(ids[1]), 5.0).unwrap();
        chain.set_blend(ids[1], Motion::Lin(ids[2]), 8.0).unwrap();
        let motions = chain.resolve(Motion::Lin(ids[0])).unwrap();
        assert_eq!(
            motions,
            vec![Motion::Lin(ids[0]), Motion::Lin(ids[1]), Motion::Lin(ids[2])]
        );

        let corners = chain.corners(Motion::Lin(ids[0])).unwrap();
        assert_eq!(corners.len(), 2);
        assert_eq!(corners[1].distance, 8.0);
        assert_eq!(corners[0].kind(), CornerKind::LineLine);
    }

    #[test]
    fn test_single_motion_has_no_corners() {
        let (chain, ids) = square();
        assert_eq!(chain.resolve(Motion::Lin(ids[3])).unwrap().len(), 1);
        assert!(chain.corners(Motion::Lin(ids[3])).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_detected() {
        let (mut chain, ids) = square();
        chain.set_blend(ids[0], Motion::Lin(ids[1]), 5.0).unwrap();
        chain.set_blend(ids[1], Motion::Lin(ids[0]), 5.0).unwrap();
        assert_eq!(
            chain.resolve(Motion::Lin(ids[0])),
            Err(TrajectoryError::CyclicChain(ids[0]))
        );
    }

    #[test]
    fn test_arc_terminal_carries_link() {
        let (mut chain, ids) = square();
        let arc = Motion::Circ([ids[0], ids[1], ids[2]]);
        chain.set_blend(ids[2], Motion::Lin(ids[3]), 5.0).unwrap();
        let motions = chain.resolve(arc).unwrap();
        assert_eq!(motions, vec![arc, Motion::Lin(ids[3])]);
        let corners = chain.corners(arc).unwrap();
        assert_eq!(corners[0].kind(), CornerKind::ArcLine);
        assert_eq!(corners[0].kind().to_string(), "arc-line");
    }

    #[test]
    fn test_unknown_pose() {
        let (mut chain, ids) = square();
        let missing = PoseId::default();
        assert_eq!(
            chain.set_blend(ids[0], Motion::Lin(missing), 5.0),
            Err(TrajectoryError::UnknownPose(missing))
        );
        assert_eq!(
            chain.resolve(Motion::Circ([ids[0], missing, ids[2]])),
            Err(TrajectoryError::UnknownPose(missing))
        );
    }

    #[test]
    fn test_negative_blend_distance_rejected() {
        let (mut chain, ids) = square();
        assert!(matches!(
            chain.set_blend(ids[0], Motion::Lin(ids[1]), -1.0),
            Err(TrajectoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_arc_span() {
        let (mut chain, ids) = square();
        chain.set_arc_span(ids[2], 270.0).unwrap();
        assert_eq!(chain.get(ids[2]).unwrap().arc_span_degrees, Some(270.0));
        assert!(matches!(
            chain.set_arc_span(ids[2], 0.0),
            Err(TrajectoryError::InvalidArgument(_))
        ));
        assert_eq!(chain.get(ids[2]).unwrap().arc_span_degrees, Some(270.0));
    }
}
