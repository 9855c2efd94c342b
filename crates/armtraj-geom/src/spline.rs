//! Splines that replace a hard corner with a smooth transition.
//!
//! Both splines interpolate every control pose and run over a uniform
//! parameter `u ∈ [0, 1]`, one equal share per control span. All six pose
//! channels are interpolated independently, so orientation follows the
//! same curve shape as position.

use armtraj_math::{Pose, Tolerance, Vec6};
use serde::{Deserialize, Serialize};

use crate::{GeomError, Result};

/// Tension used to derive Catmull-Rom tangents from neighbouring controls.
pub const CATMULL_ROM_TENSION: f64 = 0.5;

/// Which spline family synthesizes corner blends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplineKind {
    /// Uniform Catmull-Rom with duplicated endpoints.
    #[default]
    CatmullRom,
    /// Natural cubic spline (zero second derivative at both ends).
    NaturalCubic,
}

/// A curve through a sequence of poses.
pub trait PoseSpline: Send + Sync + std::fmt::Debug {
    /// Evaluate at `u ∈ [0, 1]`; `u = 0` is the first control, `u = 1` the last.
    fn evaluate(&self, u: f64) -> Pose;

    /// `count` poses spaced uniformly in `u`, inclusive of both ends.
    fn sample(&self, count: usize) -> Vec<Pose> {
        match count {
            0 => Vec::new(),
            1 => vec![self.evaluate(0.0)],
            _ => {
                let last = (count - 1) as f64;
                (0..count).map(|i| self.evaluate(i as f64 / last)).collect()
            }
        }
    }
}

/// Build the spline of the requested kind through `controls`.
pub fn blend_spline(kind: SplineKind, controls: &[Pose]) -> Result<Box<dyn PoseSpline>> {
    Ok(match kind {
        SplineKind::CatmullRom => Box::new(CatmullRom::new(controls)?),
        SplineKind::NaturalCubic => Box::new(NaturalCubic::new(controls)?),
    })
}

/// Drop consecutive coincident controls; at least two distinct ones must remain.
fn distinct_controls(controls: &[Pose]) -> Result<Vec<Vec6>> {
    let tol = Tolerance::DEFAULT;
    let mut kept: Vec<Pose> = Vec::with_capacity(controls.len());
    for pose in controls {
        if kept.last().is_some_and(|last| tol.poses_equal(last, pose)) {
            continue;
        }
        kept.push(*pose);
    }
    if kept.len() < 2 {
        return Err(GeomError::InvalidArgument(format!(
            "spline needs at least two distinct controls, got {}",
            kept.len()
        )));
    }
    Ok(kept.iter().map(Pose::to_vector).collect())
}

/// Locate `u ∈ [0, 1]` on a spline with `spans` spans: `(span index, local t)`.
fn locate(u: f64, spans: usize) -> (usize, f64) {
    let x = u.clamp(0.0, 1.0) * spans as f64;
    let i = (x.floor() as usize).min(spans - 1);
    (i, x - i as f64)
}

// =============================================================================
// Catmull-Rom
// =============================================================================

/// Uniform Catmull-Rom spline, each span stored as a cubic Bezier.
#[derive(Debug, Clone)]
pub struct CatmullRom {
    segments: Vec<[Vec6; 4]>,
}

impl CatmullRom {
    /// Spline through `controls`, duplicating the end controls for the
    /// missing outer neighbours.
    pub fn new(controls: &[Pose]) -> Result<Self> {
        let points = distinct_controls(controls)?;
        let n = points.len() as isize;
        let get = |i: isize| points[i.clamp(0, n - 1) as usize];

        let segments = (0..n - 1)
            .map(|i| {
                let (p0, p1, p2, p3) = (get(i - 1), get(i), get(i + 1), get(i + 2));
                let m1 = (p2 - p0) * CATMULL_ROM_TENSION;
                let m2 = (p3 - p1) * CATMULL_ROM_TENSION;
                [p1, p1 + m1 / 3.0, p2 - m2 / 3.0, p2]
            })
            .collect();
        Ok(Self { segments })
    }
}

impl PoseSpline for CatmullRom {
    fn evaluate(&self, u: f64) -> Pose {
        let (i, t) = locate(u, self.segments.len());
        let [p0, c1, c2, p1] = &self.segments[i];
        let s = 1.0 - t;
        let v = p0 * (s * s * s) + c1 * (3.0 * s * s * t) + c2 * (3.0 * s * t * t) + p1 * (t * t * t);
        Pose::from_vector(&v)
    }
}

// =============================================================================
// Natural cubic
// =============================================================================

/// Natural cubic spline on a uniform knot vector over `[0, 1]`.
#[derive(Debug, Clone)]
pub struct NaturalCubic {
    points: Vec<Vec6>,
    /// Second derivative at each knot.
    moments: Vec<Vec6>,
}

impl NaturalCubic {
    /// Interpolating spline through `controls` with free (zero-curvature) ends.
    pub fn new(controls: &[Pose]) -> Result<Self> {
        let points = distinct_controls(controls)?;
        let moments = natural_moments(&points);
        Ok(Self { points, moments })
    }

    fn spacing(&self) -> f64 {
        1.0 / (self.points.len() - 1) as f64
    }
}

/// Solve `M[i-1] + 4 M[i] + M[i+1] = 6/h² (p[i+1] - 2 p[i] + p[i-1])` for the
/// interior knots with the Thomas algorithm; `M` vanishes at both ends.
fn natural_moments(points: &[Vec6]) -> Vec<Vec6> {
    let n = points.len();
    let mut moments = vec![Vec6::zeros(); n];
    if n < 3 {
        return moments;
    }
    let h = 1.0 / (n - 1) as f64;
    let k = 6.0 / (h * h);
    let interior = n - 2;

    let mut c_prime = vec![0.0; interior];
    let mut d_prime = vec![Vec6::zeros(); interior];
    for j in 0..interior {
        let i = j + 1;
        let rhs = (points[i + 1] - points[i] * 2.0 + points[i - 1]) * k;
        if j == 0 {
            c_prime[j] = 1.0 / 4.0;
            d_prime[j] = rhs / 4.0;
        } else {
            let denom = 4.0 - c_prime[j - 1];
            c_prime[j] = 1.0 / denom;
            d_prime[j] = (rhs - d_prime[j - 1]) / denom;
        }
    }
    for j in (0..interior).rev() {
        let next = if j + 1 < interior {
            moments[j + 2]
        } else {
            Vec6::zeros()
        };
        moments[j + 1] = d_prime[j] - next * c_prime[j];
    }
    moments
}

impl PoseSpline for NaturalCubic {
    fn evaluate(&self, u: f64) -> Pose {
        let h = self.spacing();
        let (i, t) = locate(u, self.points.len() - 1);
        let a = h * (1.0 - t);
        let b = h * t;
        let (p0, p1) = (&self.points[i], &self.points[i + 1]);
        let (m0, m1) = (&self.moments[i], &self.moments[i + 1]);
        let v = m0 * (a * a * a / (6.0 * h))
            + m1 * (b * b * b / (6.0 * h))
            + (p0 / h - m0 * (h / 6.0)) * a
            + (p1 / h - m1 * (h / 6.0)) * b;
        Pose::from_vector(&v)
    }
}
