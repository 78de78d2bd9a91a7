//! Closed-form transform estimators for raster georeferencing.
//!
//! This crate fits the [`TransformModel`](georef_core::TransformModel) that
//! maps image pixels to geographic coordinates from a set of
//! correspondences:
//!
//! - **Similarity** ([`fit_similarity`]): exactly two points, closed form.
//! - **Affine** ([`fit_affine`]): three or more points, least squares over
//!   all of them, with collinearity detection.
//! - **Selection** ([`select_and_fit`]): picks the model by point count.
//!
//! All functions are pure and deterministic. Refitting on every change to
//! the correspondence set is cheap and is the recommended strategy.
//!
//! Fitting an affine exactly through an arbitrary three-point subset is not
//! offered; it discards evidence and does not improve as points are added.

mod affine;
pub mod math;
mod select;
mod similarity;

pub use affine::*;
pub use select::*;
pub use similarity::*;

/// Estimator for pixel-to-geo transforms.
///
/// [`similarity`](Self::similarity) fits two correspondences in closed form,
/// [`affine`](Self::affine) fits three or more by least squares and
/// [`select`](Self::select) picks between them by point count. The free
/// functions of this crate delegate to these.
#[derive(Debug, Clone, Copy)]
pub struct TransformSolver;
