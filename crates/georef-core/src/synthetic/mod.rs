//! Deterministic synthetic correspondence sets.
//!
//! Used by tests across the workspace: lay out image pixels on a grid, push
//! them through a known model, optionally perturb the geo side.
//!
//! # Example
//!
//! ```
//! use georef_core::TransformModel;
//! use georef_core::synthetic::{self, noise::UniformNoise};
//!
//! let model = TransformModel::affine(1e-4, 0.0, 13.4, 0.0, -1e-4, 52.5);
//! let pixels = synthetic::grid_pixels(4, 3, 100.0);
//! let points = synthetic::correspondences(&model, &pixels, &UniformNoise::default());
//! assert_eq!(points.len(), 12);
//! ```

pub mod noise;

use crate::{CorrespondencePoint, GeoCoordinate, PixelCoordinate, Real, TransformModel};
use noise::UniformNoise;

/// `nx * ny` pixels spaced `spacing` apart, row-major starting at the origin.
pub fn grid_pixels(nx: usize, ny: usize, spacing: Real) -> Vec<PixelCoordinate> {
    let mut pixels = Vec::with_capacity(nx.saturating_mul(ny));
    for j in 0..ny {
        for i in 0..nx {
            pixels.push(PixelCoordinate::new(
                i as Real * spacing,
                j as Real * spacing,
            ));
        }
    }
    pixels
}

/// Map each pixel through `model` and add per-point geo noise.
pub fn correspondences(
    model: &TransformModel,
    pixels: &[PixelCoordinate],
    noise: &UniformNoise,
) -> Vec<CorrespondencePoint> {
    pixels
        .iter()
        .enumerate()
        .map(|(i, &px)| {
            let geo = model.to_geo(px);
            let d = noise.sample(i);
            CorrespondencePoint::new(px, GeoCoordinate::new(geo.lon + d.x, geo.lat + d.y))
        })
        .collect()
}
