//! Contact manifold points.

use nalgebra::{Point2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::features::FeaturePair;

/// Maximum number of contact points a box pair can produce.
pub const MAX_CONTACT_POINTS: usize = 2;

/// A single contact point between two boxes.
///
/// The collider fills in the geometric fields (`position`, `normal`,
/// `separation`, `feature`); the solver fields (accumulated impulses,
/// effective masses, bias) start at zero and are owned by the arbiter that
/// caches the point. Accumulated impulses survive re-detection through
/// feature matching; everything else is recomputed every step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPoint {
    /// World-space contact position, slid onto the reference face.
    pub position: Point2<f64>,
    /// Contact normal, pointing from the first body toward the second.
    pub normal: Vector2<f64>,
    /// Offset from the first body's center (refreshed each iteration).
    pub r1: Vector2<f64>,
    /// Offset from the second body's center (refreshed each iteration).
    pub r2: Vector2<f64>,
    /// Signed separation along the normal; ≤ 0 for a valid contact.
    pub separation: f64,
    /// Accumulated normal impulse.
    pub normal_impulse: f64,
    /// Accumulated tangent (friction) impulse.
    pub tangent_impulse: f64,
    /// Accumulated normal impulse for position bias.
    pub normal_bias_impulse: f64,
    /// Effective mass along the normal.
    pub normal_mass: f64,
    /// Effective mass along the tangent.
    pub tangent_mass: f64,
    /// Baumgarte position-correction velocity.
    pub bias: f64,
    /// Identity of the edges that produced this point.
    pub feature: FeaturePair,
}

impl ContactPoint {
    /// Create a contact with zeroed solver state.
    #[must_use]
    pub fn new(
        position: Point2<f64>,
        normal: Vector2<f64>,
        separation: f64,
        feature: FeaturePair,
    ) -> Self {
        Self {
            position,
            normal,
            r1: Vector2::zeros(),
            r2: Vector2::zeros(),
            separation,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            normal_bias_impulse: 0.0,
            normal_mass: 0.0,
            tangent_mass: 0.0,
            bias: 0.0,
            feature,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroes_solver_state() {
        let c = ContactPoint::new(
            Point2::new(1.0, 2.0),
            Vector2::new(0.0, 1.0),
            -0.05,
            FeaturePair::default(),
        );
        assert_eq!(c.normal_impulse, 0.0);
        assert_eq!(c.tangent_impulse, 0.0);
        assert_eq!(c.normal_bias_impulse, 0.0);
        assert_eq!(c.separation, -0.05);
    }
}
