//! JSON-file-backed point store with an explicit lifecycle.

use super::{MapId, MapRecord, NewMap, PointId, PointPatch, PointStore, StoreData, StoredPoint};
use anyhow::{Context, Result};
use georef_core::{GeoCoordinate, PixelCoordinate};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// A [`PointStore`] persisted as one JSON document.
///
/// Lifecycle:
///
/// 1. [`JsonPointStore::open`] reads the file, or starts empty if it does not
///    exist yet.
/// 2. Mutations change the in-memory copy and mark the store dirty.
/// 3. [`JsonPointStore::flush`] writes the document (temp file + rename).
/// 4. [`JsonPointStore::close`] flushes and consumes the store;
///    [`JsonPointStore::discard`] consumes it without writing.
///
/// Dropping a dirty store without closing it logs a warning and attempts a
/// final flush; errors from that flush can only be logged.
///
/// # Example
///
/// ```no_run
/// use georef_pipeline::store::{JsonPointStore, NewMap, PointStore};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut store = JsonPointStore::open("maps.json")?;
/// store.create_map(NewMap { name: "campus".into(), image_width: 4000, image_height: 3000 })?;
/// store.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonPointStore {
    path: PathBuf,
    data: StoreData,
    dirty: bool,
}

impl JsonPointStore {
    /// Open the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// fails validation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading point store {}", path.display()))?;
            let data: StoreData = serde_json::from_str(&text)
                .with_context(|| format!("parsing point store {}", path.display()))?;
            data.validate()
                .with_context(|| format!("validating point store {}", path.display()))?;
            data
        } else {
            info!("point store {} does not exist, starting empty", path.display());
            StoreData::default()
        };
        info!(
            "opened point store {} ({} maps)",
            path.display(),
            data.list_maps().len()
        );
        Ok(Self {
            path,
            data,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` if there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pending changes. A clean store is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails; the
    /// store stays dirty in that case.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        self.dirty = false;
        info!("flushed point store {}", self.path.display());
        Ok(())
    }

    /// Flush and release the store.
    ///
    /// # Errors
    ///
    /// As [`JsonPointStore::flush`].
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        info!("closed point store {}", self.path.display());
        Ok(())
    }

    /// Release the store without writing pending changes.
    pub fn discard(mut self) {
        if self.dirty {
            info!("discarding unsaved changes to point store {}", self.path.display());
        }
        self.dirty = false;
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn mark<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_ok() {
            self.dirty = true;
        }
        result
    }
}

impl Drop for JsonPointStore {
    fn drop(&mut self) {
        if self.dirty {
            warn!(
                "point store {} dropped with unsaved changes; flushing",
                self.path.display()
            );
            if let Err(err) = self.flush() {
                error!("failed to flush point store {}: {:#}", self.path.display(), err);
            }
        }
    }
}

impl PointStore for JsonPointStore {
    fn create_map(&mut self, map: NewMap) -> Result<MapId> {
        let result = self.data.create_map(map);
        self.mark(result)
    }

    fn get_map(&self, id: MapId) -> Result<MapRecord> {
        self.data.get_map(id)
    }

    fn list_maps(&self) -> Vec<MapRecord> {
        self.data.list_maps()
    }

    fn delete_map(&mut self, id: MapId) -> Result<()> {
        let result = self.data.delete_map(id);
        self.mark(result)
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
        let result = self.data.add_point(map, pixel, geo);
        self.mark(result)
    }

    fn update_point(&mut self, id: PointId, patch: PointPatch) -> Result<()> {
        let result = self.data.update_point(id, patch);
        self.mark(result)
    }

    fn delete_point(&mut self, id: PointId) -> Result<()> {
        let result = self.data.delete_point(id);
        self.mark(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn plan() -> NewMap {
        NewMap {
            name: "plan".into(),
            image_width: 640,
            image_height: 480,
        }
    }

    #[test]
    fn close_persists_and_reopen_restores() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.json");

        let mut store = JsonPointStore::open(&path)?;
        assert!(!store.is_dirty());
        let map = store.create_map(plan())?;
        let pt = store.add_point(map, PixelCoordinate::new(1.0, 2.0), GeoCoordinate::new(3.0, 4.0))?;
        assert!(store.is_dirty());
        store.close()?;

        let store = JsonPointStore::open(&path)?;
        assert_eq!(store.get_map(map)?.name, "plan");
        assert_eq!(store.get_point(pt)?.point.geo_coordinate, GeoCoordinate::new(3.0, 4.0));
        assert!(!dir.path().join("store.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn failed_mutation_does_not_dirty() -> Result<()> {
        let dir = tempdir()?;
        let mut store = JsonPointStore::open(dir.path().join("s.json"))?;
        assert!(store.delete_point(PointId(99)).is_err());
        assert!(!store.is_dirty());
        store.close()?;
        assert!(!dir.path().join("s.json").exists());
        Ok(())
    }

    #[test]
    fn drop_flushes_dirty_store() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("s.json");
        {
            let mut store = JsonPointStore::open(&path)?;
            store.create_map(plan())?;
        }
        assert_eq!(JsonPointStore::open(&path)?.list_maps().len(), 1);
        Ok(())
    }

    #[test]
    fn discard_drops_pending_changes() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("s.json");

        let mut store = JsonPointStore::open(&path)?;
        store.create_map(plan())?;
        store.close()?;

        let mut store = JsonPointStore::open(&path)?;
        let map = store.list_maps()[0].id;
        store.add_point(map, PixelCoordinate::new(1.0, 1.0), GeoCoordinate::new(1.0, 1.0))?;
        store.delete_map(map)?;
        store.discard();

        let store = JsonPointStore::open(&path)?;
        assert_eq!(store.list_maps().len(), 1);
        assert!(store.list_points(map)?.is_empty());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("s.json");
        fs::write(&path, "{ not json")?;
        let err = JsonPointStore::open(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing point store"));
        Ok(())
    }
}
