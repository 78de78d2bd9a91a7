//! In-process point store.

use super::{MapId, MapRecord, NewMap, PointId, PointPatch, PointStore, StoreData, StoredPoint};
use anyhow::Result;
use georef_core::{GeoCoordinate, PixelCoordinate};

/// A [`PointStore`] that lives only as long as the value.
///
/// # Example
///
/// ```
/// use georef_core::{GeoCoordinate, PixelCoordinate};
/// use georef_pipeline::store::{MemoryPointStore, NewMap, PointStore};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut store = MemoryPointStore::new();
/// let map = store.create_map(NewMap { name: "plan".into(), image_width: 800, image_height: 600 })?;
/// store.add_point(map, PixelCoordinate::new(10.0, 20.0), GeoCoordinate::new(13.4, 52.5))?;
/// assert_eq!(store.list_points(map)?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPointStore {
    data: StoreData,
}

impl MemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointStore for MemoryPointStore {
    fn create_map(&mut self, map: NewMap) -> Result<MapId> {
        self.data.create_map(map)
    }

    fn get_map(&self, id: MapId) -> Result<MapRecord> {
        self.data.get_map(id)
    }

    fn list_maps(&self) -> Vec<MapRecord> {
        self.data.list_maps()
    }

    fn delete_map(&mut self, id: MapId) -> Result<()> {
        self.data.delete_map(id)
    }

    fn list_points(&self, map: MapId) -> Result<Vec<StoredPoint>> {
        self.data.list_points(map)
    }

    fn get_point(&self, id: PointId) -> Result<StoredPoint> {
        self.data.get_point(id)
    }

    fn add_point(
        &mut self,
        map: MapId,
        pixel: PixelCoordinate,
        geo: GeoCoordinate,
    ) -> Result<PointId> {
        self.data.add_point(map, pixel, geo)
    }

    fn update_point(&mut self, id: PointId, patch: PointPatch) -> Result<()> {
        self.data.update_point(id, patch)
    }

    fn delete_point(&mut self, id: PointId) -> Result<()> {
        self.data.delete_point(id)
    }
}
