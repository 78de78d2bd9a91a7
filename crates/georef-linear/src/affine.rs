//! Least-squares affine estimation from three or more correspondences.
//!
//! Longitude and latitude are fitted independently as linear functions of
//! `(x, y, 1)` over **all** supplied points. Both share the same 3x3 normal
//! matrix
//!
//! ```text
//! | Σx²  Σxy  Σx |
//! | Σxy  Σy²  Σy |
//! | Σx   Σy   n  |
//! ```
//!
//! The points are rejected as collinear when the determinant of this matrix,
//! over raw pixel coordinates, falls below
//! [`SolverOptions::singular_tolerance`].
//!
//! The system is assembled and solved on Hartley-normalized pixels. With
//! `q = T p` the normalized matrix is `T M Tᵀ`, so the raw determinant is
//! recovered as `det(T M Tᵀ) / det(T)²`; this avoids the cancellation of
//! summing `x²` terms of large or far-from-origin pixel coordinates. The
//! solution is mapped back to raw pixel coordinates before returning.

use crate::{TransformSolver, math::normalize_points_2d};
use georef_core::{
    Affine, CorrespondencePoint, Mat23, Mat3, Pt2, SolverOptions, TransformError, Vec3,
};
use log::debug;

/// Fit an affine transform by least squares with default tolerances.
///
/// # Errors
///
/// - [`TransformError::InsufficientPoints`] below three points.
/// - [`TransformError::CollinearPoints`] when the normal equations are singular.
/// - [`TransformError::NonFinite`] when the input contains NaN or infinities.
pub fn fit_affine(points: &[CorrespondencePoint]) -> Result<Affine, TransformError> {
    TransformSolver::affine(points, &SolverOptions::default())
}

/// Fit an affine transform by least squares.
///
/// # Errors
///
/// As [`fit_affine`].
pub fn fit_affine_with(
    points: &[CorrespondencePoint],
    opts: &SolverOptions,
) -> Result<Affine, TransformError> {
    TransformSolver::affine(points, opts)
}

impl TransformSolver {
    /// Least-squares affine fit over every point in `points`.
    ///
    /// See [`fit_affine`].
    pub fn affine(
        points: &[CorrespondencePoint],
        opts: &SolverOptions,
    ) -> Result<Affine, TransformError> {
        let n = points.len();
        if n < 3 {
            return Err(TransformError::InsufficientPoints {
                required: 3,
                got: n,
            });
        }
        if points
            .iter()
            .any(|p| !p.image_pixel.is_finite() || !p.geo_coordinate.is_finite())
        {
            return Err(TransformError::NonFinite);
        }

        let pixels: Vec<Pt2> = points.iter().map(|p| p.image_pixel.to_point()).collect();
        let Some((pixels_n, t)) = normalize_points_2d(&pixels) else {
            debug!("affine rejected: all {} pixels coincide", n);
            return Err(TransformError::CollinearPoints);
        };

        let mut ata = Mat3::zeros();
        let mut atb_lon = Vec3::zeros();
        let mut atb_lat = Vec3::zeros();
        for (q, p) in pixels_n.iter().zip(points) {
            let row = Vec3::new(q.x, q.y, 1.0);
            ata += row * row.transpose();
            atb_lon += row * p.geo_coordinate.lon;
            atb_lat += row * p.geo_coordinate.lat;
        }

        // det(T M Tᵀ) = det(T)² det(M)
        let det = ata.determinant() / t.determinant().powi(2);
        if opts.is_singular(det) {
            debug!(
                "affine rejected: normal matrix determinant {:.3e} over {} points",
                det, n
            );
            return Err(TransformError::CollinearPoints);
        }

        let lu = ata.lu();
        let lon = lu.solve(&atb_lon).ok_or(TransformError::CollinearPoints)?;
        let lat = lu.solve(&atb_lat).ok_or(TransformError::CollinearPoints)?;

        // De-normalize: [A | t] acts on T * p.
        let m = Mat23::new(lon.x, lon.y, lon.z, lat.x, lat.y, lat.z) * t;
        let model = Affine {
            a: m[(0, 0)],
            b: m[(0, 1)],
            c: m[(0, 2)],
            d: m[(1, 0)],
            e: m[(1, 1)],
            f: m[(1, 2)],
        };
        if !model.is_finite() {
            return Err(TransformError::NonFinite);
        }

        debug!("affine fit over {} points: {:?}", n, model.params());
        Ok(model)
    }
}
