//! Numerical conditioning helpers shared by the estimators.
//!
//! # Hartley Normalization
//!
//! Normal equations built from raw pixel coordinates mix sums of order
//! `n`, `n * width` and `n * width^2`; for large scans or cropped images far
//! from the origin they are badly conditioned. Estimators solve on centered,
//! rescaled pixels and map the solution back through the returned matrix.

use georef_core::{Mat3, Pt2, Real, Vec2};
use std::f64::consts::SQRT_2;

/// Center `points` on their centroid and scale them to a mean distance of
/// `√2` from the origin.
///
/// Returns the normalized points together with the homogeneous matrix `T`
/// that produced them (`q = T * [x, y, 1]ᵀ`), or `None` when the input is
/// empty or every point coincides.
///
/// See Hartley & Zisserman, "Multiple View Geometry in Computer Vision",
/// 2nd ed., Algorithm 4.2.
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as Real;
    let centroid = Pt2::from(points.iter().map(|p| p.coords).sum::<Vec2>() / n);
    let mean_dist = points.iter().map(|p| (p - centroid).norm()).sum::<Real>() / n;
    if !(mean_dist > Real::EPSILON) {
        return None;
    }

    let s = SQRT_2 / mean_dist;
    #[rustfmt::skip]
    let t = Mat3::new(
        s,   0.0, -s * centroid.x,
        0.0, s,   -s * centroid.y,
        0.0, 0.0, 1.0,
    );
    let normalized = points
        .iter()
        .map(|p| Pt2::from((p - centroid) * s))
        .collect();

    Some((normalized, t))
}
