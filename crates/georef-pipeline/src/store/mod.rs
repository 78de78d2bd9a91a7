//! Persistence of maps and their correspondence points.
//!
//! [`PointStore`] is the interface the rest of the workspace consumes. Two
//! implementations are provided:
//!
//! - [`MemoryPointStore`]: in-process, nothing persisted.
//! - [`JsonPointStore`]: a single JSON document on disk with an explicit
//!   `open` / `flush` / `close` lifecycle.
//!
//! Stores are plain owned values passed to whoever needs them; there is no
//! process-wide handle. Mutation requires `&mut`, so concurrent writers are
//! serialized by the borrow checker (or by whatever lock the owner wraps the
//! store in).
//!
//! Points of a map are returned in insertion order. The first two are
//! significant: they determine a two-point similarity fit.

mod json;
mod memory;
mod types;

pub use json::JsonPointStore;
pub use memory::MemoryPointStore;
pub use types::*;

use anyhow::{Result, anyhow, ensure};
use georef_core::{CorrespondencePoint, GeoCoordinate, PixelCoordinate};
use serde::{Deserialize, Serialize};

/// Store of maps and their correspondence points.
pub trait PointStore {
    /// Register a new map image.
    fn create_map(&mut self, map: NewMap) -> Result<MapId>;

    fn get_map(&self, id: MapId) -> Result<MapRecord>;

    fn list_maps(&self) -> Vec<MapRecord>;

    /// Remove a map together with all of its points.
    fn delete_map(&mut self, id: MapId) -> Result<()>;

    /// Points of a map in insertion order.
    fn list_points(&self, map: MapId) -> Result<Vec<StoredPoint>>;

    fn get_point(&self, id: PointId) -> Result<StoredPoint>;

    fn add_point(
        &mut self,
        map: MapId,
        pixel: PixelCoordinate,
        geo: GeoCoordinate,
    ) -> Result<PointId>;

    /// Overwrite the fields set in `patch`.
    fn update_point(&mut self, id: PointId, patch: PointPatch) -> Result<()>;

    fn delete_point(&mut self, id: PointId) -> Result<()>;

    /// The correspondences of a map in insertion order, ready for fitting.
    fn correspondences(&self, map: MapId) -> Result<Vec<CorrespondencePoint>> {
        Ok(self
            .list_points(map)?
            .into_iter()
            .map(|p| p.point)
            .collect())
    }
}

impl<S: PointStore + ?Sized> PointStore for &mut S {
    fn create_map(&mut self, map: NewMap) -> Result<MapId> {
        (**self).create_map(map)
    }

    fn get_map(&self, id: MapId) -> Result<MapRecord> {
        (**self).get_map(id)
    }

    fn list_maps(&self) -> Vec<MapRecord> {
        (**self).list_maps()
    }

    fn delete_map(&mut self, id: MapId) -> Result<()> {
        (**self).delete_map(id)
    }

    fn list_points(&self, map: MapId) -> Result<Vec<StoredPoint>> {
        (**self).list_points(map)
    }

    fn get_point(&self, id: PointId) -> Result<StoredPoint> {
        (**self).get_point(id)
    }

    fn add_point(
        &mut self,
        map: MapId,
        pixel: PixelCoordinate,
        geo: GeoCoordinate,
    ) -> Result<PointId> {
        (**self).add_point(map, pixel, geo)
    }

    fn update_point(&mut self, id: PointId, patch: PointPatch) -> Result<()> {
        (**self).update_point(id, patch)
    }

    fn delete_point(&mut self, id: PointId) -> Result<()> {
        (**self).delete_point(id)
    }
}

/// Version of the serialized [`StoreData`] layout.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Complete store contents; the unit of (de)serialization.
///
/// Points are kept in one vector in global insertion order, so filtering by
/// map preserves per-map insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    pub schema_version: u32,
    next_id: u64,
    maps: Vec<MapRecord>,
    points: Vec<StoredPoint>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            next_id: 1,
            maps: Vec::new(),
            points: Vec::new(),
        }
    }
}

impl StoreData {
    fn allocate_id(&mut self) -> Result<u64> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| anyhow!("point store id space exhausted"))?;
        Ok(id)
    }

    fn map_index(&self, id: MapId) -> Result<usize> {
        self.maps
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| anyhow!("unknown {}", id))
    }

    fn point_index(&self, id: PointId) -> Result<usize> {
        self.points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| anyhow!("unknown {}", id))
    }

    /// Check internal consistency after loading from an external source.
    ///
    /// # Errors
    ///
    /// Returns an error on an unsupported schema version, duplicate ids,
    /// ids at or above the allocation counter, or points referencing a
    /// missing map.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.schema_version == STORE_SCHEMA_VERSION,
            "unsupported store schema version {} (expected {})",
            self.schema_version,
            STORE_SCHEMA_VERSION
        );
        let mut ids: Vec<u64> = self
            .maps
            .iter()
            .map(|m| m.id.0)
            .chain(self.points.iter().map(|p| p.id.0))
            .collect();
        ids.sort_unstable();
        ensure!(
            ids.windows(2).all(|w| w[0] != w[1]),
            "duplicate ids in store"
        );
        if let Some(&max) = ids.last() {
            ensure!(
                max < self.next_id,
                "id {} not below allocation counter {}",
                max,
                self.next_id
            );
        }
        for p in &self.points {
            ensure!(
                self.maps.iter().any(|m| m.id == p.map_id),
                "{} references missing {}",
                p.id,
                p.map_id
            );
        }
        Ok(())
    }

    pub(crate) fn create_map(&mut self, map: NewMap) -> Result<MapId> {
        ensure!(!map.name.trim().is_empty(), "map name must not be empty");
        let id = MapId(self.allocate_id()?);
        self.maps.push(MapRecord {
            id,
            name: map.name,
            image_width: map.image_width,
            image_height: map.image_height,
            created_at: current_timestamp(),
        });
        Ok(id)
    }

    pub(crate) fn get_map(&self, id: MapId) -> Result<MapRecord> {
        Ok(self.maps[self.map_index(id)?].clone())
    }

    pub(crate) fn list_maps(&self) -> Vec<MapRecord> {
        self.maps.clone()
    }

    pub(crate) fn delete_map(&mut self, id: MapId) -> Result<()> {
        let idx = self.map_index(id)?;
        self.maps.remove(idx);
        self.points.retain(|p| p.map_id != id);
        Ok(())
    }

    pub(crate) fn list_points(&self, map: MapId) -> Result<Vec<StoredPoint>> {
        self.map_index(map)?;
        Ok(self
            .points
            .iter()
            .filter(|p| p.map_id == map)
            .cloned()
            .collect())
    }

    pub(crate) fn get_point(&self, id: PointId) -> Result<StoredPoint> {
        Ok(self.points[self.point_index(id)?].clone())
    }

    pub(crate) fn add_point(
        &mut self,
        map: MapId,
        pixel: PixelCoordinate,
        geo: GeoCoordinate,
    ) -> Result<PointId> {
        self.map_index(map)?;
        ensure!(pixel.is_finite(), "pixel coordinate is not finite");
        ensure!(geo.is_finite(), "geo coordinate is not finite");
        let id = PointId(self.allocate_id()?);
        self.points.push(StoredPoint {
            id,
            map_id: map,
            point: CorrespondencePoint::new(pixel, geo),
            created_at: current_timestamp(),
        });
        Ok(id)
    }

    pub(crate) fn update_point(&mut self, id: PointId, patch: PointPatch) -> Result<()> {
        let idx = self.point_index(id)?;
        if let Some(pixel) = patch.pixel {
            ensure!(pixel.is_finite(), "pixel coordinate is not finite");
        }
        if let Some(geo) = patch.geo {
            ensure!(geo.is_finite(), "geo coordinate is not finite");
        }
        patch.apply(&mut self.points[idx].point);
        Ok(())
    }

    pub(crate) fn delete_point(&mut self, id: PointId) -> Result<()> {
        let idx = self.point_index(id)?;
        self.points.remove(idx);
        Ok(())
    }
}
