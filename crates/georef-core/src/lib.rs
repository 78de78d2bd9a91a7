//! Core types for georeferencing a raster image against geographic coordinates.
//!
//! This crate provides the foundational building blocks used by the rest of
//! the workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat23`, and friends),
//! - pixel / geo coordinates and the correspondences between them,
//! - the fitted [`TransformModel`] (similarity or affine) with forward
//!   (`pixel -> geo`) and inverse (`geo -> pixel`) evaluation,
//! - the [`TransformError`] taxonomy shared by estimators and evaluators,
//! - residual statistics for judging a fit.
//!
//! Fitting lives in `georef-linear`; persistence and session glue live in
//! `georef-pipeline`.
//!
//! # Example
//!
//! ```
//! use georef_core::{GeoCoordinate, PixelCoordinate, TransformModel, to_geo, to_pixel};
//!
//! let model = TransformModel::similarity(0.01, std::f64::consts::FRAC_PI_2, 0.0, 0.0);
//! let geo = to_geo(PixelCoordinate::new(50.0, 0.0), &model);
//! assert!((geo.lat - 0.5).abs() < 1e-12);
//!
//! let px = to_pixel(GeoCoordinate::new(0.0, 0.5), &model).unwrap();
//! assert!((px.x - 50.0).abs() < 1e-9);
//! ```

mod error;
/// Linear algebra type aliases and helpers.
mod math;
/// Transform models and their evaluators.
mod model;
mod residuals;
/// Deterministic synthetic correspondence helpers.
///
/// Public so that integration tests across the workspace can share it.
pub mod synthetic;
/// Coordinates, correspondences and solver options.
mod types;

pub use error::*;
pub use math::*;
pub use model::*;
pub use residuals::*;
pub use types::*;
