//! High-level entry crate for georeferencing raster images.
//!
//! Supply two or more correspondences between image pixels and geographic
//! coordinates; get back a transform that maps pixels to `(lon, lat)` and
//! positions back onto the image.
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> anyhow::Result<()> {
//! use georef::prelude::*;
//!
//! let points = vec![
//!     CorrespondencePoint::from_tuples((0.0, 0.0), (10.0, 20.0)),
//!     CorrespondencePoint::from_tuples((1.0, 0.0), (11.0, 20.0)),
//!     CorrespondencePoint::from_tuples((0.0, 1.0), (10.0, 21.0)),
//! ];
//! let model = select_and_fit(&points)?.expect("three points");
//!
//! let geo = to_geo(PixelCoordinate::new(5.0, 5.0), &model);
//! assert!((geo.lon - 15.0).abs() < 1e-9 && (geo.lat - 25.0).abs() < 1e-9);
//!
//! let px = to_pixel(geo, &model)?;
//! assert!((px.x - 5.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`core`] - coordinates, transform models, evaluators, errors
//! - [`linear`] - similarity / affine estimators and model selection
//! - [`pipeline`] - point stores and interactive map sessions
//!
//! # Model Selection
//!
//! | Points | Model |
//! |--------|-------|
//! | 0, 1 | none |
//! | 2 | similarity (scale, rotation, translation) |
//! | 3+ | affine, least squares over all points |
//!
//! Longitude and latitude are treated as planar coordinates; results are
//! only meaningful over small geographic extents.

/// Coordinates, transform models and evaluators.
pub mod core {
    pub use georef_core::*;
}

/// Closed-form estimators.
pub mod linear {
    pub use georef_linear::*;
}

/// Point stores and map sessions.
pub mod pipeline {
    pub use georef_pipeline::*;
}

/// Convenient imports for common usage.
pub mod prelude {
    pub use georef_core::{
        Affine, CorrespondencePoint, GeoCoordinate, PixelCoordinate, ResidualStats,
        Similarity, SolverOptions, TransformError, TransformModel, to_geo, to_pixel,
    };
    pub use georef_linear::{
        FitReport, fit_affine, fit_report, fit_similarity, select_and_fit, select_and_fit_with,
    };
    pub use georef_pipeline::session::{MapSession, SessionConfig};
    pub use georef_pipeline::store::{
        JsonPointStore, MapId, MemoryPointStore, NewMap, PointId, PointPatch, PointStore,
    };
}
