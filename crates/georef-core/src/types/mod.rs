//! Common types shared across the georeferencing workspace.
//!
//! Coordinates, correspondences and the numerical options consumed by the
//! estimators.

mod coords;
mod options;

pub use coords::*;
pub use options::*;
