//! Fitted planar transforms between image pixels and geographic coordinates.
//!
//! Two model kinds exist:
//!
//! - [`Similarity`]: uniform scale + rotation + translation, fitted in closed
//!   form from exactly two correspondences.
//! - [`Affine`]: the general six-parameter linear map
//!   `lon = a*x + b*y + c`, `lat = d*x + e*y + f`, fitted by least squares
//!   from three or more correspondences.
//!
//! Forward evaluation ([`TransformModel::to_geo`]) is total for finite input.
//! Inverse evaluation ([`TransformModel::to_pixel`]) fails with
//! [`TransformError::SingularTransform`] when the linear part cannot be
//! inverted. For any non-singular model the two are exact algebraic inverses.
//!
//! Models are immutable; a changed correspondence set requires a new fit.

use crate::{
    GeoCoordinate, Mat23, PixelCoordinate, Real, SolverOptions, TransformError,
    apply_affine,
};
use serde::{Deserialize, Serialize};

/// Uniform scale, rotation (radians) and translation.
///
/// ```text
/// lon = s*cos(r)*x - s*sin(r)*y + tx
/// lat = s*sin(r)*x + s*cos(r)*y + ty
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub scale: Real,
    pub rotation: Real,
    pub translate_x: Real,
    pub translate_y: Real,
}

impl Similarity {
    pub const PARAMS: usize = 4;

    pub fn to_geo(&self, pixel: PixelCoordinate) -> GeoCoordinate {
        let (sin, cos) = self.rotation.sin_cos();
        let sc = self.scale * cos;
        let ss = self.scale * sin;
        GeoCoordinate::new(
            sc * pixel.x - ss * pixel.y + self.translate_x,
            ss * pixel.x + sc * pixel.y + self.translate_y,
        )
    }

    /// Undo the translation, then apply the inverse rotation-scale.
    ///
    /// # Errors
    ///
    /// [`TransformError::SingularTransform`] when `scale` is (numerically) zero.
    pub fn to_pixel(
        &self,
        geo: GeoCoordinate,
        opts: &SolverOptions,
    ) -> Result<PixelCoordinate, TransformError> {
        if opts.is_singular(self.scale) {
            return Err(TransformError::SingularTransform);
        }
        let (sin, cos) = self.rotation.sin_cos();
        let lon = geo.lon - self.translate_x;
        let lat = geo.lat - self.translate_y;
        Ok(PixelCoordinate::new(
            (cos * lon + sin * lat) / self.scale,
            (-sin * lon + cos * lat) / self.scale,
        ))
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite()
            && self.rotation.is_finite()
            && self.translate_x.is_finite()
            && self.translate_y.is_finite()
    }

    pub fn params(&self) -> [Real; 4] {
        [self.scale, self.rotation, self.translate_x, self.translate_y]
    }

    /// The equivalent six-coefficient affine form.
    pub fn to_affine(&self) -> Affine {
        let (sin, cos) = self.rotation.sin_cos();
        Affine {
            a: self.scale * cos,
            b: -self.scale * sin,
            c: self.translate_x,
            d: self.scale * sin,
            e: self.scale * cos,
            f: self.translate_y,
        }
    }
}

/// General affine map `lon = a*x + b*y + c`, `lat = d*x + e*y + f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: Real,
    pub b: Real,
    pub c: Real,
    pub d: Real,
    pub e: Real,
    pub f: Real,
}

impl Affine {
    pub const PARAMS: usize = 6;

    /// Full `[A | t]` matrix.
    pub fn matrix(&self) -> Mat23 {
        Mat23::new(self.a, self.b, self.c, self.d, self.e, self.f)
    }

    pub fn determinant(&self) -> Real {
        self.a * self.e - self.b * self.d
    }

    pub fn to_geo(&self, pixel: PixelCoordinate) -> GeoCoordinate {
        apply_affine(&self.matrix(), &pixel.to_point()).into()
    }

    /// Shift by `(-c, -f)` and apply the closed-form 2x2 inverse.
    ///
    /// # Errors
    ///
    /// [`TransformError::SingularTransform`] when `|a*e - b*d|` is below the
    /// configured tolerance.
    pub fn to_pixel(
        &self,
        geo: GeoCoordinate,
        opts: &SolverOptions,
    ) -> Result<PixelCoordinate, TransformError> {
        let det = self.determinant();
        if opts.is_singular(det) {
            return Err(TransformError::SingularTransform);
        }
        let lon = geo.lon - self.c;
        let lat = geo.lat - self.f;
        Ok(PixelCoordinate::new(
            (self.e * lon - self.b * lat) / det,
            (-self.d * lon + self.a * lat) / det,
        ))
    }

    pub fn is_finite(&self) -> bool {
        self.params().iter().all(|v| v.is_finite())
    }

    pub fn params(&self) -> [Real; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// A fitted transform, tagged by kind.
///
/// Serialized as `{"kind": "similarity" | "affine", "params": [...]}`.
/// Decoding an unrecognized kind fails with
/// [`TransformError::UnknownModelKind`].
///
/// # Example
///
/// ```
/// use georef_core::{GeoCoordinate, PixelCoordinate, TransformModel};
///
/// let model = TransformModel::affine(1.0, 0.0, 10.0, 0.0, 1.0, 20.0);
/// let geo = model.to_geo(PixelCoordinate::new(5.0, 5.0));
/// assert_eq!(geo, GeoCoordinate::new(15.0, 25.0));
///
/// let px = model.to_pixel(geo).unwrap();
/// assert!((px.x - 5.0).abs() < 1e-12 && (px.y - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaggedModel", into = "TaggedModel")]
pub enum TransformModel {
    Similarity(Similarity),
    Affine(Affine),
}

impl TransformModel {
    pub const SIMILARITY: &'static str = "similarity";
    pub const AFFINE: &'static str = "affine";

    pub fn similarity(scale: Real, rotation: Real, translate_x: Real, translate_y: Real) -> Self {
        TransformModel::Similarity(Similarity {
            scale,
            rotation,
            translate_x,
            translate_y,
        })
    }

    pub fn affine(a: Real, b: Real, c: Real, d: Real, e: Real, f: Real) -> Self {
        TransformModel::Affine(Affine { a, b, c, d, e, f })
    }

    /// Rebuild a model from its tag and flat parameter list.
    ///
    /// # Errors
    ///
    /// - [`TransformError::UnknownModelKind`] for an unrecognized `kind`.
    /// - [`TransformError::ParameterCount`] when `params` has the wrong length.
    pub fn from_parts(kind: &str, params: &[Real]) -> Result<Self, TransformError> {
        let expected = match kind {
            Self::SIMILARITY => Similarity::PARAMS,
            Self::AFFINE => Affine::PARAMS,
            other => return Err(TransformError::UnknownModelKind(other.to_string())),
        };
        if params.len() != expected {
            return Err(TransformError::ParameterCount {
                kind: kind.to_string(),
                expected,
                got: params.len(),
            });
        }
        Ok(match kind {
            Self::SIMILARITY => Self::similarity(params[0], params[1], params[2], params[3]),
            _ => Self::affine(
                params[0], params[1], params[2], params[3], params[4], params[5],
            ),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TransformModel::Similarity(_) => Self::SIMILARITY,
            TransformModel::Affine(_) => Self::AFFINE,
        }
    }

    pub fn params(&self) -> Vec<Real> {
        match self {
            TransformModel::Similarity(s) => s.params().to_vec(),
            TransformModel::Affine(a) => a.params().to_vec(),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            TransformModel::Similarity(s) => s.is_finite(),
            TransformModel::Affine(a) => a.is_finite(),
        }
    }

    /// Six-coefficient affine form of either kind.
    pub fn as_affine(&self) -> Affine {
        match self {
            TransformModel::Similarity(s) => s.to_affine(),
            TransformModel::Affine(a) => *a,
        }
    }

    /// Image pixel to geographic coordinate.
    pub fn to_geo(&self, pixel: PixelCoordinate) -> GeoCoordinate {
        match self {
            TransformModel::Similarity(s) => s.to_geo(pixel),
            TransformModel::Affine(a) => a.to_geo(pixel),
        }
    }

    /// Geographic coordinate to image pixel with default tolerances.
    ///
    /// # Errors
    ///
    /// [`TransformError::SingularTransform`] when the linear part is not invertible.
    pub fn to_pixel(&self, geo: GeoCoordinate) -> Result<PixelCoordinate, TransformError> {
        self.to_pixel_with(geo, &SolverOptions::default())
    }

    /// Geographic coordinate to image pixel.
    ///
    /// # Errors
    ///
    /// [`TransformError::SingularTransform`] when the linear part is not invertible.
    pub fn to_pixel_with(
        &self,
        geo: GeoCoordinate,
        opts: &SolverOptions,
    ) -> Result<PixelCoordinate, TransformError> {
        match self {
            TransformModel::Similarity(s) => s.to_pixel(geo, opts),
            TransformModel::Affine(a) => a.to_pixel(geo, opts),
        }
    }
}

impl From<Similarity> for TransformModel {
    fn from(s: Similarity) -> Self {
        TransformModel::Similarity(s)
    }
}

impl From<Affine> for TransformModel {
    fn from(a: Affine) -> Self {
        TransformModel::Affine(a)
    }
}

/// Forward evaluation: image pixel to geographic coordinate.
pub fn to_geo(pixel: PixelCoordinate, model: &TransformModel) -> GeoCoordinate {
    model.to_geo(pixel)
}

/// Inverse evaluation: geographic coordinate to image pixel.
///
/// # Errors
///
/// [`TransformError::SingularTransform`] when the model cannot be inverted.
pub fn to_pixel(
    geo: GeoCoordinate,
    model: &TransformModel,
) -> Result<PixelCoordinate, TransformError> {
    model.to_pixel(geo)
}

/// Serialized form of [`TransformModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaggedModel {
    kind: String,
    params: Vec<Real>,
}

impl TryFrom<TaggedModel> for TransformModel {
    type Error = TransformError;

    fn try_from(raw: TaggedModel) -> Result<Self, Self::Error> {
        TransformModel::from_parts(&raw.kind, &raw.params)
    }
}

impl From<TransformModel> for TaggedModel {
    fn from(model: TransformModel) -> Self {
        TaggedModel {
            kind: model.kind().to_string(),
            params: model.params(),
        }
    }
}
