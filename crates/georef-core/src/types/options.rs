//! Numerical options for fitting and inverting transforms.

use crate::{DEFAULT_SINGULAR_TOLERANCE, Real};
use serde::{Deserialize, Serialize};

/// Tolerances used by the estimators and the inverse evaluator.
///
/// # Example
///
/// ```
/// use georef_core::SolverOptions;
///
/// let opts = SolverOptions::default();
/// assert_eq!(opts.singular_tolerance, 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Magnitude below which the affine normal-equation determinant, the
    /// inverse determinant `a*e - b*d`, or a similarity scale is singular.
    pub singular_tolerance: Real,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

impl SolverOptions {
    pub fn with_tolerance(singular_tolerance: Real) -> Self {
        Self { singular_tolerance }
    }

    /// `true` when `value` is too small (or not finite) to divide by.
    #[inline]
    pub fn is_singular(&self, value: Real) -> bool {
        !value.is_finite() || value.abs() < self.singular_tolerance
    }
}
