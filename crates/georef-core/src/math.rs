use nalgebra::{Matrix2x3, Matrix3, Point2, Vector2, Vector3};

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt2 = Point2<Real>;
pub type Mat3 = Matrix3<Real>;
pub type Mat23 = Matrix2x3<Real>;

/// Default magnitude below which a determinant (or similarity scale) is
/// treated as singular.
pub const DEFAULT_SINGULAR_TOLERANCE: Real = 1e-10;

pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Apply a 2x3 affine matrix `[A | t]` to a point.
pub fn apply_affine(m: &Mat23, p: &Pt2) -> Pt2 {
    let v = m * to_homogeneous(p);
    Pt2::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_application_matches_manual() {
        let m = Mat23::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let p = apply_affine(&m, &Pt2::new(1.0, -1.0));
        assert!((p.x - 2.0).abs() < 1e-12);
        assert!((p.y - 5.0).abs() < 1e-12);
    }
}
