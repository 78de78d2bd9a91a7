//! Point persistence and interactive map sessions for raster georeferencing.
//!
//! - [`store`]: the [`PointStore`](store::PointStore) interface with an
//!   in-memory and a JSON-file implementation.
//! - [`session`]: [`MapSession`](session::MapSession), which keeps a fitted
//!   transform in sync with a map's correspondence points and converts
//!   position fixes and image taps between pixel and geo space.

pub mod session;
pub mod store;
