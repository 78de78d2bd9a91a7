use super::SessionConfig;
use crate::store::{MapId, MapRecord, PointId, PointPatch, PointStore};
use anyhow::{Result, ensure};
use georef_core::{CorrespondencePoint, GeoCoordinate, PixelCoordinate, TransformModel};
use georef_linear::{FitReport, fit_report, select_and_fit_with};
use log::{debug, warn};

/// One map of a point store plus a lazily fitted transform.
///
/// The fitted model is cached. Every point mutation made through the session
/// clears the cache before the mutating call returns, so the next
/// [`locate`](Self::locate) / [`pick`](Self::pick) always sees a model fitted
/// from the current point set.
///
/// Mutations made to the store behind the session's back (through
/// [`store_mut`](Self::store_mut)) also clear the cache.
#[derive(Debug)]
pub struct MapSession<S: PointStore> {
    store: S,
    map: MapRecord,
    config: SessionConfig,
    /// `None`: stale. `Some(None)`: fewer than two points.
    cached: Option<Option<TransformModel>>,
}

impl<S: PointStore> MapSession<S> {
    /// Bind `map_id` of `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the map does not exist.
    pub fn new(store: S, map_id: MapId, config: SessionConfig) -> Result<Self> {
        let map = store.get_map(map_id)?;
        Ok(Self {
            store,
            map,
            config,
            cached: None,
        })
    }

    pub fn map(&self) -> &MapRecord {
        &self.map
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration; the cached model is dropped.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
        self.invalidate();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access. The cached model is dropped.
    pub fn store_mut(&mut self) -> &mut S {
        self.invalidate();
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Forget the cached model.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// The map's correspondences in insertion order.
    pub fn points(&self) -> Result<Vec<CorrespondencePoint>> {
        self.store.correspondences(self.map.id)
    }

    /// The transform for the current point set, fitted on demand.
    ///
    /// Returns `Ok(None)` while fewer than two points exist.
    ///
    /// # Errors
    ///
    /// Fitting errors (coincident or collinear points) are returned as-is and
    /// are not cached.
    pub fn transform(&mut self) -> Result<Option<TransformModel>> {
        if let Some(model) = self.cached {
            return Ok(model);
        }
        let points = self.points()?;
        let model = select_and_fit_with(&points, &self.config.solver)?;
        debug!(
            "{}: fitted {} from {} points",
            self.map.id,
            model.as_ref().map_or("no model", |m| m.kind()),
            points.len()
        );
        self.cached = Some(model);
        Ok(model)
    }

    /// Selected model and its residuals for the current point set.
    ///
    /// # Errors
    ///
    /// As [`transform`](Self::transform).
    pub fn fit_report(&self) -> Result<Option<FitReport>> {
        let points = self.points()?;
        Ok(fit_report(&points, &self.config.solver)?)
    }

    /// Add a correspondence.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid coordinates or a store failure.
    pub fn add_point(&mut self, pixel: PixelCoordinate, geo: GeoCoordinate) -> Result<PointId> {
        self.check_geo(&geo)?;
        self.invalidate();
        self.store.add_point(self.map.id, pixel, geo)
    }

    /// Update a correspondence of this map.
    ///
    /// # Errors
    ///
    /// Returns an error if the point belongs to another map, on invalid
    /// coordinates, or on a store failure.
    pub fn update_point(&mut self, id: PointId, patch: PointPatch) -> Result<()> {
        self.check_owned(id)?;
        if let Some(geo) = &patch.geo {
            self.check_geo(geo)?;
        }
        self.invalidate();
        self.store.update_point(id, patch)
    }

    /// Delete a correspondence of this map.
    ///
    /// # Errors
    ///
    /// Returns an error if the point belongs to another map or on a store failure.
    pub fn delete_point(&mut self, id: PointId) -> Result<()> {
        self.check_owned(id)?;
        self.invalidate();
        self.store.delete_point(id)
    }

    /// Project a live position fix onto the image.
    ///
    /// Returns `Ok(None)` while no transform is derivable (fewer than two
    /// points); the caller should hide its marker.
    ///
    /// # Errors
    ///
    /// - invalid fix coordinates,
    /// - fitting errors,
    /// - [`TransformError::SingularTransform`](georef_core::TransformError::SingularTransform)
    ///   when the model cannot be inverted (skip this frame).
    pub fn locate(&mut self, fix: GeoCoordinate) -> Result<Option<PixelCoordinate>> {
        self.check_geo(&fix)?;
        let Some(model) = self.transform()? else {
            warn!("{}: cannot locate fix without a transform", self.map.id);
            return Ok(None);
        };
        Ok(Some(model.to_pixel_with(fix, &self.config.solver)?))
    }

    /// Map an image position (e.g. a tap) to a geographic coordinate.
    ///
    /// Returns `Ok(None)` while no transform is derivable.
    ///
    /// # Errors
    ///
    /// Non-finite pixel input or fitting errors.
    pub fn pick(&mut self, pixel: PixelCoordinate) -> Result<Option<GeoCoordinate>> {
        ensure!(pixel.is_finite(), "pixel coordinate is not finite");
        Ok(self.transform()?.map(|model| model.to_geo(pixel)))
    }

    fn check_geo(&self, geo: &GeoCoordinate) -> Result<()> {
        if self.config.validate_geo_ranges {
            geo.validate()
        } else {
            ensure!(geo.is_finite(), "geo coordinate is not finite");
            Ok(())
        }
    }

    fn check_owned(&self, id: PointId) -> Result<()> {
        let point = self.store.get_point(id)?;
        ensure!(
            point.map_id == self.map.id,
            "{} belongs to {}, not {}",
            id,
            point.map_id,
            self.map.id
        );
        Ok(())
    }
}
