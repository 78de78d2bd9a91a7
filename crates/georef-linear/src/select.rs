//! Model selection by correspondence count.
//!
//! | points | model |
//! |--------|-------|
//! | 0, 1   | none (no transform derivable yet) |
//! | 2      | [`Similarity`](georef_core::Similarity) through both points |
//! | 3+     | least-squares [`Affine`](georef_core::Affine) over all points |

use crate::TransformSolver;
use georef_core::{
    CorrespondencePoint, ResidualStats, SolverOptions, TransformError, TransformModel,
    residual_stats,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Pick and fit the model appropriate for `points.len()`, default tolerances.
///
/// Returns `Ok(None)` for fewer than two points.
///
/// # Errors
///
/// Propagates the fitter's error (coincident or collinear points, non-finite input).
///
/// # Example
///
/// ```
/// use georef_core::{CorrespondencePoint, TransformModel};
/// use georef_linear::select_and_fit;
///
/// let points = vec![
///     CorrespondencePoint::from_tuples((0.0, 0.0), (10.0, 20.0)),
///     CorrespondencePoint::from_tuples((1.0, 0.0), (11.0, 20.0)),
///     CorrespondencePoint::from_tuples((0.0, 1.0), (10.0, 21.0)),
/// ];
/// let model = select_and_fit(&points).unwrap().unwrap();
/// assert!(matches!(model, TransformModel::Affine(_)));
/// assert!(select_and_fit(&points[..1]).unwrap().is_none());
/// ```
pub fn select_and_fit(
    points: &[CorrespondencePoint],
) -> Result<Option<TransformModel>, TransformError> {
    TransformSolver::select(points, &SolverOptions::default())
}

/// Pick and fit the model appropriate for `points.len()`.
///
/// # Errors
///
/// As [`select_and_fit`].
pub fn select_and_fit_with(
    points: &[CorrespondencePoint],
    opts: &SolverOptions,
) -> Result<Option<TransformModel>, TransformError> {
    TransformSolver::select(points, opts)
}

/// A selected model together with how well it reproduces its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub model: TransformModel,
    pub residuals: ResidualStats,
}

/// Select, fit and evaluate residuals in one call.
///
/// Returns `Ok(None)` for fewer than two points.
///
/// # Errors
///
/// As [`select_and_fit`].
pub fn fit_report(
    points: &[CorrespondencePoint],
    opts: &SolverOptions,
) -> Result<Option<FitReport>, TransformError> {
    let Some(model) = TransformSolver::select(points, opts)? else {
        return Ok(None);
    };
    let residuals = residual_stats(points, &model)?;
    Ok(Some(FitReport { model, residuals }))
}

impl TransformSolver {
    /// Minimum number of correspondences for any model.
    pub const MIN_POINTS: usize = 2;

    /// Dispatch on point count. See [`select_and_fit`].
    pub fn select(
        points: &[CorrespondencePoint],
        opts: &SolverOptions,
    ) -> Result<Option<TransformModel>, TransformError> {
        let model = match points.len() {
            n if n < Self::MIN_POINTS => {
                debug!("{} point(s): no transform derivable yet", points.len());
                return Ok(None);
            }
            2 => TransformModel::from(TransformSolver::similarity(&points[0], &points[1])?),
            _ => TransformModel::from(TransformSolver::affine(points, opts)?),
        };
        debug!("selected {} model for {} points", model.kind(), points.len());
        Ok(Some(model))
    }
}
