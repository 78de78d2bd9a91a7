//! Map sessions: the glue between a point store and the transform engine.
//!
//! A [`MapSession`] binds one map of a [`PointStore`](crate::store::PointStore)
//! and answers the two questions an interactive front end asks on every
//! frame or gesture:
//!
//! - where on the image is this position fix? ([`MapSession::locate`])
//! - which geo coordinate did the user tap? ([`MapSession::pick`])
//!
//! ```no_run
//! use georef_core::{GeoCoordinate, PixelCoordinate};
//! use georef_pipeline::session::{MapSession, SessionConfig};
//! use georef_pipeline::store::{JsonPointStore, MapId};
//! # fn main() -> anyhow::Result<()> {
//!
//! let store = JsonPointStore::open("maps.json")?;
//! let mut session = MapSession::new(store, MapId(1), SessionConfig::default())?;
//!
//! session.add_point(PixelCoordinate::new(120.0, 80.0), GeoCoordinate::new(13.40, 52.52))?;
//! if let Some(px) = session.locate(GeoCoordinate::new(13.41, 52.51))? {
//!     println!("marker at {:?}", px);
//! }
//! session.into_store().close()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod map_session;

pub use config::SessionConfig;
pub use map_session::MapSession;
