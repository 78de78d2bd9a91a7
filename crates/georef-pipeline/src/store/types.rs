//! Logical schema of persisted maps and correspondence points.

use georef_core::{CorrespondencePoint, GeoCoordinate, PixelCoordinate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Identifier of a georeferenced image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u64);

/// Identifier of a stored correspondence point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{}", self.0)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point#{}", self.0)
    }
}

/// Fields supplied when registering a new map image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMap {
    pub name: String,
    /// Image width in pixels.
    pub image_width: u32,
    /// Image height in pixels.
    pub image_height: u32,
}

/// A registered map image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: MapId,
    pub name: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Unix timestamp (seconds).
    pub created_at: u64,
}

/// A correspondence point owned by one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPoint {
    pub id: PointId,
    pub map_id: MapId,
    pub point: CorrespondencePoint,
    /// Unix timestamp (seconds).
    pub created_at: u64,
}

/// Partial update of a stored point; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel: Option<PixelCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoCoordinate>,
}

impl PointPatch {
    pub fn pixel(pixel: PixelCoordinate) -> Self {
        Self {
            pixel: Some(pixel),
            geo: None,
        }
    }

    pub fn geo(geo: GeoCoordinate) -> Self {
        Self {
            pixel: None,
            geo: Some(geo),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixel.is_none() && self.geo.is_none()
    }

    pub fn apply(&self, point: &mut CorrespondencePoint) {
        if let Some(pixel) = self.pixel {
            point.image_pixel = pixel;
        }
        if let Some(geo) = self.geo {
            point.geo_coordinate = geo;
        }
    }
}

/// Current Unix timestamp in seconds (0 if the clock is before the epoch).
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
