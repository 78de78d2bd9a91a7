//! Fit-quality statistics over a correspondence set.

use crate::{CorrespondencePoint, Real, TransformError, TransformModel};
use serde::{Deserialize, Serialize};

/// Summary of forward-mapping residuals, in degrees of the planar geo frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualStats {
    /// Per-point distance between `to_geo(pixel)` and the observed geo
    /// coordinate, in input order.
    pub residuals: Vec<Real>,
    /// Mean residual.
    pub mean: Real,
    /// Root mean square residual.
    pub rms: Real,
    /// Largest residual.
    pub max: Real,
    /// Number of points evaluated.
    pub count: usize,
}

impl ResidualStats {
    /// Compute statistics from per-point residuals.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_residuals(residuals: Vec<Real>) -> Option<Self> {
        if residuals.is_empty() {
            return None;
        }
        let n = residuals.len() as Real;
        let sum: Real = residuals.iter().sum();
        let sum_sq: Real = residuals.iter().map(|r| r * r).sum();
        let max = residuals.iter().copied().fold(0.0, Real::max);
        Some(Self {
            mean: sum / n,
            rms: (sum_sq / n).sqrt(),
            max,
            count: residuals.len(),
            residuals,
        })
    }

    /// Index of the worst-fitting point.
    pub fn worst_index(&self) -> Option<usize> {
        self.residuals
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }
}

/// Evaluate how well `model` reproduces the geo side of each correspondence.
///
/// # Errors
///
/// [`TransformError::InsufficientPoints`] for an empty point set.
pub fn residual_stats(
    points: &[CorrespondencePoint],
    model: &TransformModel,
) -> Result<ResidualStats, TransformError> {
    let residuals = points
        .iter()
        .map(|p| model.to_geo(p.image_pixel).distance(&p.geo_coordinate))
        .collect();
    ResidualStats::from_residuals(residuals).ok_or(TransformError::InsufficientPoints {
        required: 1,
        got: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_from_known_residuals() {
        let stats = ResidualStats::from_residuals(vec![3.0, 0.0, 4.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 7.0 / 3.0).abs() < 1e-12);
        assert!((stats.rms - (25.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.worst_index(), Some(2));
    }

    #[test]
    fn empty_set_is_an_error() {
        let model = TransformModel::similarity(1.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            residual_stats(&[], &model),
            Err(TransformError::InsufficientPoints { .. })
        ));
    }

    #[test]
    fn exact_model_has_zero_residuals() {
        let model = TransformModel::affine(2.0, 0.0, 1.0, 0.0, 2.0, -1.0);
        let points = vec![
            CorrespondencePoint::from_tuples((0.0, 0.0), (1.0, -1.0)),
            CorrespondencePoint::from_tuples((1.0, 1.0), (3.0, 1.0)),
        ];
        let stats = residual_stats(&points, &model).unwrap();
        assert!(stats.max < 1e-12, "max {}", stats.max);
    }
}
