//! Session configuration.

use georef_core::SolverOptions;
use serde::{Deserialize, Serialize};

/// Configuration of a [`MapSession`](super::MapSession).
///
/// # Example
///
/// ```
/// use georef_pipeline::session::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{"validate_geo_ranges": false}"#).unwrap();
/// assert!(!config.validate_geo_ranges);
/// assert_eq!(config.solver.singular_tolerance, 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tolerances for fitting and inverse evaluation.
    pub solver: SolverOptions,
    /// Reject geo input outside lon [-180, 180] / lat [-90, 90].
    pub validate_geo_ranges: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            solver: SolverOptions::default(),
            validate_geo_ranges: true,
        }
    }
}
