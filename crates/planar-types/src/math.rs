//! 2D math helpers layered over nalgebra.
//!
//! nalgebra supplies the vector/matrix algebra; this module names the 2D
//! cross-product family that planar dynamics leans on. In two dimensions the
//! cross product degenerates: vector × vector is a scalar (the z component
//! of the 3D cross), and scalar × vector rotates the vector a quarter turn.
//!
//! # Example
//!
//! ```
//! use planar_types::math::{cross, cross_scalar, rotation, tangent};
//! use nalgebra::Vector2;
//!
//! let x = Vector2::new(1.0, 0.0);
//! let y = Vector2::new(0.0, 1.0);
//!
//! assert_eq!(cross(&x, &y), 1.0);
//! assert_eq!(cross_scalar(1.0, &x), y);
//! assert_eq!(tangent(&y), x);
//!
//! // Rotation matrices are column-major [cos, sin; -sin, cos]
//! let r = rotation(std::f64::consts::FRAC_PI_2);
//! assert!((r * x - y).norm() < 1e-12);
//! ```

use nalgebra::{Rotation2, Vector2};

/// Build the rotation matrix for an angle in radians.
///
/// Columns are `(cos θ, sin θ)` and `(−sin θ, cos θ)`.
#[must_use]
pub fn rotation(angle: f64) -> Rotation2<f64> {
    Rotation2::new(angle)
}

/// Scalar 2D cross product: `a.x·b.y − a.y·b.x`.
///
/// This is the z component of the 3D cross product of the two vectors
/// lifted into the plane.
#[must_use]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar (angular velocity) with a vector: `ω × r`.
///
/// Yields the velocity contribution of a rotation about the origin at the
/// offset `r`.
#[must_use]
pub fn cross_scalar(s: f64, v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-s * v.y, s * v.x)
}

/// The clockwise perpendicular of a vector: `v × 1`.
///
/// For a unit contact normal this is the friction tangent direction.
#[must_use]
pub fn tangent(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(v.y, -v.x)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_columns() {
        let r = rotation(0.3);
        let m = r.into_inner();
        assert_relative_eq!(m[(0, 0)], 0.3f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(m[(1, 0)], 0.3f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(m[(0, 1)], -(0.3f64.sin()), epsilon = 1e-12);
        assert_relative_eq!(m[(1, 1)], 0.3f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_antisymmetry() {
        let a = Vector2::new(1.5, -2.0);
        let b = Vector2::new(0.25, 4.0);
        assert_relative_eq!(cross(&a, &b), -cross(&b, &a), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_scalar_is_quarter_turn() {
        let r = Vector2::new(3.0, 1.0);
        let v = cross_scalar(2.0, &r);
        // omega x r is perpendicular to r with magnitude |omega||r|
        assert_relative_eq!(v.dot(&r), 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.norm(), 2.0 * r.norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_tangent_orthogonal() {
        let n = Vector2::new(0.6, 0.8);
        let t = tangent(&n);
        assert_relative_eq!(n.dot(&t), 0.0, epsilon = 1e-12);
        assert_relative_eq!(t.norm(), 1.0, epsilon = 1e-12);
        // n x t = -1 for the clockwise perpendicular
        assert_relative_eq!(cross(&n, &t), -1.0, epsilon = 1e-12);
    }
}
