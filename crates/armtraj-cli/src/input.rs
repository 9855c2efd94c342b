//! Input file formats.

use anyhow::{bail, Context, Result};
use armtraj::{Motion, Point3, Pose, PoseChain, PoseId, TrajectorySettings, Waypoint};
use serde::Deserialize;

fn default_blend_distance() -> f64 {
    armtraj::armtraj_path::DEFAULT_BLEND_DISTANCE
}

/// A trajectory job: settings, an optional start pose and the motions to run.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    /// Build parameters; omitted fields take their defaults.
    #[serde(default)]
    pub settings: TrajectorySettings,
    /// Pose the arm occupies before the first motion.
    pub start: Option<Pose>,
    /// Motions in execution order.
    #[serde(rename = "motion", default)]
    pub motions: Vec<MotionEntry>,
}

/// One `[[motion]]` table.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum MotionEntry {
    /// Straight line to `target`.
    Lin {
        target: Pose,
        #[serde(default = "default_blend_distance")]
        blend_distance: f64,
        /// Blend into the next motion instead of stopping at `target`.
        #[serde(default)]
        blend: bool,
    },
    /// Arc from `from` (or the current position) through `via` to `target`.
    Circ {
        from: Option<Pose>,
        via: Pose,
        target: Pose,
        #[serde(default = "default_blend_distance")]
        blend_distance: f64,
        arc_span_degrees: Option<f64>,
        #[serde(default)]
        blend: bool,
    },
}

impl MotionEntry {
    fn blend(&self) -> bool {
        match self {
            MotionEntry::Lin { blend, .. } | MotionEntry::Circ { blend, .. } => *blend,
        }
    }
}

/// Waypoints of a job and the head motion of each blended run.
#[derive(Debug)]
pub struct Plan {
    pub chain: PoseChain,
    pub heads: Vec<Motion>,
}

impl JobFile {
    /// Parse a job from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let job: JobFile = toml::from_str(text).context("invalid job file")?;
        job.settings.validate()?;
        Ok(job)
    }

    /// Insert every motion into a chain, linking blended neighbours.
    ///
    /// A motion that does not blend ends its run; the next motion starts a
    /// new run from wherever the previous one stopped.
    pub fn plan(&self) -> Result<Plan> {
        if self.motions.is_empty() {
            bail!("job has no motions");
        }
        let mut chain = PoseChain::new();
        let mut heads = Vec::new();
        let mut previous: Option<(PoseId, bool)> = None;

        for entry in &self.motions {
            let motion = match entry {
                MotionEntry::Lin {
                    target,
                    blend_distance,
                    ..
                } => Motion::Lin(chain.insert_waypoint(Waypoint {
                    blend_distance: *blend_distance,
                    ..Waypoint::new(*target)
                })),
                MotionEntry::Circ {
                    from,
                    via,
                    target,
                    blend_distance,
                    arc_span_degrees,
                    ..
                } => {
                    let first = match (from, previous) {
                        (Some(pose), _) => chain.insert(*pose),
                        (None, Some((id, _))) => id,
                        (None, None) => chain.insert(
                            self.start
                                .context("the first arc needs `from` or a job `start` pose")?,
                        ),
                    };
                    let via = chain.insert(*via);
                    let end = chain.insert_waypoint(Waypoint {
                        blend_distance: *blend_distance,
                        ..Waypoint::new(*target)
                    });
                    if let Some(span) = arc_span_degrees {
                        chain.set_arc_span(end, *span)?;
                    }
                    Motion::Circ([first, via, end])
                }
            };
            match previous {
                Some((id, true)) => {
                    let distance = chain.get(id)?.blend_distance;
                    chain.set_blend(id, motion, distance)?;
                }
                _ => heads.push(motion),
            }
            previous = Some((motion.terminal(), entry.blend()));
        }
        Ok(Plan { chain, heads })
    }
}

/// Four flange poses touching one fixed point.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCalibrationInput {
    pub poses: Vec<Pose>,
}

/// Origin, X-axis and Y-axis probe points.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseCalibrationInput {
    pub points: Vec<[f64; 3]>,
}

impl BaseCalibrationInput {
    pub fn points(&self) -> Vec<Point3> {
        self.points
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armtraj::{CornerKind, SplineKind};

    const JOB: &str = r#"
        start = { x = 0.0, y = 0.0, z = 100.0 }

        [settings]
        sample_count = 10
        spline = "natural_cubic"

        [[motion]]
        kind = "lin"
        target = { x = 100.0, y = 0.0, z = 100.0, b = 90.0 }
        blend = true

        [[motion]]
        kind = "circ"
        via = { x = 150.0, y = 50.0, z = 100.0 }
        target = { x = 100.0, y = 100.0, z = 100.0 }
        blend_distance = 8.0
        blend = true

        [[motion]]
        kind = "lin"
        target = { x = 0.0, y = 100.0, z = 100.0 }

        [[motion]]
        kind = "lin"
        target = { x = 0.0, y = 0.0, z = 100.0 }
    "#;

    #[test]
    fn test_parse_job() {
        let job = JobFile::parse(JOB).unwrap();
        assert_eq!(job.settings.sample_count, 10);
        assert_eq!(job.settings.spline, SplineKind::NaturalCubic);
        assert!((job.settings.line_bisector_multiplier - 0.3).abs() < 1e-12);
        assert_eq!(job.motions.len(), 4);
        assert_eq!(job.start, Some(Pose::at(0.0, 0.0, 100.0)));
    }

    #[test]
    fn test_plan_splits_runs_at_unblended_motions() {
        let plan = JobFile::parse(JOB).unwrap().plan().unwrap();
        assert_eq!(plan.heads.len(), 2);

        let corners = plan.chain.corners(plan.heads[0]).unwrap();
        let kinds: Vec<CornerKind> = corners.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![CornerKind::LineArc, CornerKind::ArcLine]);
        assert_eq!(corners[0].distance, 5.0);
        assert_eq!(corners[1].distance, 8.0);
        assert!(plan.chain.corners(plan.heads[1]).unwrap().is_empty());
    }

    #[test]
    fn test_arc_starts_at_previous_terminal() {
        let plan = JobFile::parse(JOB).unwrap().plan().unwrap();
        let corners = plan.chain.corners(plan.heads[0]).unwrap();
        let Motion::Circ([first, _, _]) = corners[0].outgoing else {
            panic!("expected an arc");
        };
        assert_eq!(first, corners[0].incoming.terminal());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = JobFile::parse("[[motion]]\nkind = \"lin\"\ntarget = { x = 1.0, y = 0.0, z = 0.0 }\nspeed = 3\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(JobFile::parse("[settings]\nsample_count = 1\n").is_err());
    }

    #[test]
    fn test_first_arc_without_origin() {
        let job = JobFile::parse(
            "[[motion]]\nkind = \"circ\"\nvia = { x = 1.0, y = 1.0, z = 0.0 }\ntarget = { x = 2.0, y = 0.0, z = 0.0 }\n",
        )
        .unwrap();
        assert!(job.plan().is_err());
    }

    #[test]
    fn test_calibration_inputs() {
        let tool: ToolCalibrationInput = toml::from_str(
            "poses = [{ x = 1.0, y = 2.0, z = 3.0, a = 180.0, b = 0.0, c = 0.0 }]",
        )
        .unwrap();
        assert_eq!(tool.poses[0].a, 180.0);

        let base: BaseCalibrationInput =
            toml::from_str("points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]").unwrap();
        assert_eq!(base.points()[2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_arc_span_applied_to_arc_end() {
        let job = JobFile::parse(
            "start = { x = 0.0, y = 0.0, z = 0.0 }\n[[motion]]\nkind = \"circ\"\nvia = { x = 1.0, y = 1.0, z = 0.0 }\ntarget = { x = 2.0, y = 0.0, z = 0.0 }\narc_span_degrees = 270.0\n",
        )
        .unwrap();
        let plan = job.plan().unwrap();
        let Motion::Circ([_, _, end]) = plan.heads[0] else {
            panic!("expected an arc");
        };
        assert_eq!(plan.chain.get(end).unwrap().arc_span_degrees, Some(270.0));

        let negative = JobFile::parse(
            "start = { x = 0.0, y = 0.0, z = 0.0 }\n[[motion]]\nkind = \"circ\"\nvia = { x = 1.0, y = 1.0, z = 0.0 }\ntarget = { x = 2.0, y = 0.0, z = 0.0 }\narc_span_degrees = -10.0\n",
        )
        .unwrap();
        assert!(negative.plan().is_err());
    }
}
