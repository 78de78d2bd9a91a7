//! Pixel and geographic coordinates, and the correspondences between them.
//!
//! Geographic coordinates are treated as a Cartesian plane with longitude on
//! the x axis and latitude on the y axis. This planar approximation is only
//! meaningful over small extents (a city map, a campus plan); it is kept as-is
//! because fitted coefficients of existing correspondence sets depend on it.

use crate::{Pt2, Real};
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// A real-valued position in the source image's pixel space.
///
/// No bounds are enforced; callers usually keep values within
/// `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelCoordinate {
    pub x: Real,
    pub y: Real,
}

impl PixelCoordinate {
    pub fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Pt2 {
        Pt2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another pixel.
    pub fn distance(&self, other: &PixelCoordinate) -> Real {
        (self.to_point() - other.to_point()).norm()
    }
}

impl From<Pt2> for PixelCoordinate {
    fn from(p: Pt2) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<PixelCoordinate> for Pt2 {
    fn from(p: PixelCoordinate) -> Self {
        p.to_point()
    }
}

/// Longitude / latitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lon: Real,
    pub lat: Real,
}

impl GeoCoordinate {
    pub fn new(lon: Real, lat: Real) -> Self {
        Self { lon, lat }
    }

    /// `(lon, lat)` as a planar point (`x = lon`, `y = lat`).
    pub fn to_point(self) -> Pt2 {
        Pt2::new(self.lon, self.lat)
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Planar distance in degrees.
    pub fn distance(&self, other: &GeoCoordinate) -> Real {
        (self.to_point() - other.to_point()).norm()
    }

    /// Check that the coordinate is finite and within the WGS84 ranges.
    ///
    /// The transform engine never calls this; it is meant for the
    /// interaction boundary where user or sensor input enters the system.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending component.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.is_finite(), "geo coordinate is not finite: {:?}", self);
        ensure!(
            (-180.0..=180.0).contains(&self.lon),
            "longitude {} outside [-180, 180]",
            self.lon
        );
        ensure!(
            (-90.0..=90.0).contains(&self.lat),
            "latitude {} outside [-90, 90]",
            self.lat
        );
        Ok(())
    }
}

impl From<Pt2> for GeoCoordinate {
    fn from(p: Pt2) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<GeoCoordinate> for Pt2 {
    fn from(g: GeoCoordinate) -> Self {
        g.to_point()
    }
}

/// One observed pairing between an image pixel and a geographic position.
///
/// Points are interchangeable except that the first two of an ordered list
/// determine a two-point similarity fit.
///
/// # Example
///
/// ```
/// use georef_core::{CorrespondencePoint, GeoCoordinate, PixelCoordinate};
///
/// let p = CorrespondencePoint::new(
///     PixelCoordinate::new(120.0, 80.0),
///     GeoCoordinate::new(13.405, 52.52),
/// );
/// assert_eq!(p.image_pixel.x, 120.0);
/// assert_eq!(p.geo_coordinate.lat, 52.52);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrespondencePoint {
    pub image_pixel: PixelCoordinate,
    pub geo_coordinate: GeoCoordinate,
}

impl CorrespondencePoint {
    pub fn new(image_pixel: PixelCoordinate, geo_coordinate: GeoCoordinate) -> Self {
        Self {
            image_pixel,
            geo_coordinate,
        }
    }

    /// Shorthand taking `(x, y)` and `(lon, lat)` tuples.
    pub fn from_tuples(pixel: (Real, Real), geo: (Real, Real)) -> Self {
        Self::new(
            PixelCoordinate::new(pixel.0, pixel.1),
            GeoCoordinate::new(geo.0, geo.1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_validation_rejects_out_of_range() {
        assert!(GeoCoordinate::new(13.4, 52.5).validate().is_ok());
        assert!(GeoCoordinate::new(180.0, -90.0).validate().is_ok());
        assert!(GeoCoordinate::new(180.5, 0.0).validate().is_err());
        assert!(GeoCoordinate::new(0.0, 91.0).validate().is_err());
        assert!(GeoCoordinate::new(Real::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn point_conversions() {
        let px = PixelCoordinate::from(Pt2::new(3.0, 4.0));
        assert_eq!(px.distance(&PixelCoordinate::default()), 5.0);
        let geo: Pt2 = GeoCoordinate::new(1.0, 2.0).into();
        assert_eq!(geo, Pt2::new(1.0, 2.0));
    }

    #[test]
    fn correspondence_serde_layout() {
        let p = CorrespondencePoint::from_tuples((1.0, 2.0), (3.0, 4.0));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(
            json,
            r#"{"image_pixel":{"x":1.0,"y":2.0},"geo_coordinate":{"lon":3.0,"lat":4.0}}"#
        );
    }
}
