//! Two-point similarity estimation (closed form).
//!
//! Longitude and latitude are treated as planar `x` / `y`. Given two
//! correspondences, the displacement between them in pixel space and in geo
//! space fully determines a uniform scale, a rotation and a translation:
//!
//! ```text
//! scale    = |d_geo| / |d_img|
//! rotation = atan2(d_geo) - atan2(d_img)
//! t        = geo_1 - s*R(rotation)*img_1
//! ```

use crate::TransformSolver;
use georef_core::{CorrespondencePoint, Similarity, TransformError};
use log::debug;

/// Fit a similarity through exactly two correspondences.
///
/// # Errors
///
/// - [`TransformError::CoincidentPoints`] when both points share a pixel
///   (the scale would be non-finite).
/// - [`TransformError::NonFinite`] when any coordinate is NaN or infinite.
pub fn fit_similarity(
    p1: &CorrespondencePoint,
    p2: &CorrespondencePoint,
) -> Result<Similarity, TransformError> {
    TransformSolver::similarity(p1, p2)
}

/// Fit a similarity from the first two points of an ordered list.
///
/// Further points are ignored; this is not an averaging fit.
///
/// # Errors
///
/// [`TransformError::InsufficientPoints`] below two points, otherwise as
/// [`fit_similarity`].
pub fn fit_similarity_points(
    points: &[CorrespondencePoint],
) -> Result<Similarity, TransformError> {
    match points {
        [p1, p2, ..] => TransformSolver::similarity(p1, p2),
        _ => Err(TransformError::InsufficientPoints {
            required: 2,
            got: points.len(),
        }),
    }
}

impl TransformSolver {
    /// Closed-form similarity through two correspondences.
    ///
    /// See [`fit_similarity`].
    pub fn similarity(
        p1: &CorrespondencePoint,
        p2: &CorrespondencePoint,
    ) -> Result<Similarity, TransformError> {
        let img1 = p1.image_pixel.to_point();
        let img2 = p2.image_pixel.to_point();
        let d_img = img2 - img1;
        let d_geo = p2.geo_coordinate.to_point() - p1.geo_coordinate.to_point();

        let img_len = d_img.norm();
        if !img_len.is_finite() || !d_geo.norm().is_finite() {
            return Err(TransformError::NonFinite);
        }
        let scale = d_geo.norm() / img_len;
        if img_len == 0.0 || !scale.is_finite() {
            debug!(
                "similarity rejected: pixels coincide at ({}, {})",
                img1.x, img1.y
            );
            return Err(TransformError::CoincidentPoints);
        }

        let rotation = d_geo.y.atan2(d_geo.x) - d_img.y.atan2(d_img.x);
        let (sin, cos) = rotation.sin_cos();
        let geo1 = p1.geo_coordinate;
        let model = Similarity {
            scale,
            rotation,
            translate_x: geo1.lon - (scale * cos * img1.x - scale * sin * img1.y),
            translate_y: geo1.lat - (scale * sin * img1.x + scale * cos * img1.y),
        };

        if !model.is_finite() {
            return Err(TransformError::NonFinite);
        }
        debug!(
            "similarity fit: scale={:.6e} rotation={:.6} rad",
            model.scale, model.rotation
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::{GeoCoordinate, PixelCoordinate, TransformModel};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn image_x_axis_to_latitude() {
        let p1 = CorrespondencePoint::from_tuples((0.0, 0.0), (0.0, 0.0));
        let p2 = CorrespondencePoint::from_tuples((100.0, 0.0), (0.0, 1.0));
        let sim = fit_similarity(&p1, &p2).unwrap();

        assert!((sim.scale - 0.01).abs() < 1e-12, "scale {}", sim.scale);
        assert!(
            (sim.rotation - FRAC_PI_2).abs() < 1e-12,
            "rotation {}",
            sim.rotation
        );

        let geo = sim.to_geo(PixelCoordinate::new(50.0, 0.0));
        assert!(geo.lon.abs() < 1e-12, "lon {}", geo.lon);
        assert!((geo.lat - 0.5).abs() < 1e-12, "lat {}", geo.lat);
    }

    #[test]
    fn interpolates_both_points() {
        let p1 = CorrespondencePoint::from_tuples((120.0, 340.0), (13.3777, 52.5163));
        let p2 = CorrespondencePoint::from_tuples((910.0, 75.0), (13.4050, 52.5200));
        let model = TransformModel::from(fit_similarity(&p1, &p2).unwrap());

        for p in [&p1, &p2] {
            let geo = model.to_geo(p.image_pixel);
            assert!(
                geo.distance(&p.geo_coordinate) < 1e-12,
                "{:?} vs {:?}",
                geo,
                p.geo_coordinate
            );
        }
    }

    #[test]
    fn coincident_pixels_are_rejected() {
        let p1 = CorrespondencePoint::from_tuples((10.0, 10.0), (1.0, 1.0));
        let p2 = CorrespondencePoint::from_tuples((10.0, 10.0), (2.0, 2.0));
        assert_eq!(
            fit_similarity(&p1, &p2),
            Err(TransformError::CoincidentPoints)
        );
    }

    #[test]
    fn nan_input_is_rejected() {
        let p1 = CorrespondencePoint::from_tuples((0.0, 0.0), (f64::NAN, 1.0));
        let p2 = CorrespondencePoint::from_tuples((10.0, 10.0), (2.0, 2.0));
        assert_eq!(fit_similarity(&p1, &p2), Err(TransformError::NonFinite));
    }

    #[test]
    fn coincident_geo_gives_zero_scale() {
        let p1 = CorrespondencePoint::from_tuples((0.0, 0.0), (5.0, 5.0));
        let p2 = CorrespondencePoint::from_tuples((10.0, 0.0), (5.0, 5.0));
        let sim = fit_similarity(&p1, &p2).unwrap();
        assert_eq!(sim.scale, 0.0);
        let model = TransformModel::from(sim);
        assert_eq!(
            model.to_pixel(GeoCoordinate::new(5.0, 5.0)),
            Err(TransformError::SingularTransform)
        );
    }

    #[test]
    fn only_first_two_points_are_used() {
        let points = vec![
            CorrespondencePoint::from_tuples((0.0, 0.0), (0.0, 0.0)),
            CorrespondencePoint::from_tuples((100.0, 0.0), (0.0, 1.0)),
            CorrespondencePoint::from_tuples((0.0, 100.0), (50.0, 50.0)),
        ];
        let from_list = fit_similarity_points(&points).unwrap();
        let from_pair = fit_similarity(&points[0], &points[1]).unwrap();
        assert_eq!(from_list, from_pair);

        assert_eq!(
            fit_similarity_points(&points[..1]),
            Err(TransformError::InsufficientPoints {
                required: 2,
                got: 1
            })
        );
    }
}
