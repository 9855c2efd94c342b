//! Tool-offset calibration.
//!
//! The operator touches one fixed point with the tool tip from four flange
//! orientations. The tip sits at `flange + R · offset` in every pose, so the
//! offset is the vector that brings the four tips together.

use armtraj_math::{Point3, Pose, Transform, Vec3};
use nalgebra::DVector;
use tracing::debug;

use crate::solver::{minimize, LmConfig};
use crate::{round_to, CalibrationError, Result};

/// Number of flange poses required by [`calibrate_tool_offset`].
pub const TOOL_CALIBRATION_POSES: usize = 4;

/// Starting guess: a tool pointing 100 mm along flange Z.
const INITIAL_OFFSET: [f64; 3] = [0.0, 0.0, 100.0];

/// Result of a tool-offset solve.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCalibration {
    /// Offset in the controller's convention: rounded to 4 decimals with Z negated.
    pub offset: Vec3,
    /// Largest distance between any two tool-tip estimates at the solution (mm).
    pub spread: f64,
    /// Solver iterations.
    pub iterations: usize,
}

fn tip(pose: &Pose, offset: &Vec3) -> Point3 {
    Transform::from_pose(pose).apply_point(&Point3::from(*offset))
}

fn tips(poses: &[Pose], offset: &Vec3) -> Vec<Point3> {
    poses.iter().map(|p| tip(p, offset)).collect()
}

fn max_spread(points: &[Point3]) -> f64 {
    let mut spread: f64 = 0.0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            spread = spread.max((a - b).norm());
        }
    }
    spread
}

/// Solve for the tool offset with explicit solver settings.
pub fn solve_tool_offset(poses: &[Pose], config: &LmConfig) -> Result<ToolCalibration> {
    if poses.len() != TOOL_CALIBRATION_POSES {
        return Err(CalibrationError::InvalidArgument(format!(
            "tool calibration needs exactly {TOOL_CALIBRATION_POSES} poses, got {}",
            poses.len()
        )));
    }

    // One residual per coordinate of every pairwise tip difference.
    let residuals = |x: &DVector<f64>| {
        let offset = Vec3::new(x[0], x[1], x[2]);
        let points = tips(poses, &offset);
        let mut r = Vec::with_capacity(18);
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                r.extend((a - b).iter().copied());
            }
        }
        DVector::from_vec(r)
    };

    let report = minimize(residuals, DVector::from_row_slice(&INITIAL_OFFSET), config)?;
    let solved = Vec3::new(report.solution[0], report.solution[1], report.solution[2]);
    let spread = max_spread(&tips(poses, &solved));
    debug!(
        iterations = report.iterations,
        spread,
        "tool offset converged"
    );

    Ok(ToolCalibration {
        offset: Vec3::new(
            round_to(solved.x, 4),
            round_to(solved.y, 4),
            -round_to(solved.z, 4),
        ),
        spread,
        iterations: report.iterations,
    })
}

/// Tool offset from exactly four flange poses touching one point.
///
/// Rotation of each pose is `Rz(c)·Ry(b)·Rx(a)`. The result is rounded to
/// 4 decimals and its Z component is negated.
pub fn calibrate_tool_offset(poses: &[Pose]) -> Result<Vec3> {
    solve_tool_offset(poses, &LmConfig::default()).map(|c| c.offset)
}
