//! Rigid body state.
//!
//! A [`Body`] is an oriented rectangle with a pose, a twist, force
//! accumulators, and mass properties. Mass properties live behind accessors
//! so the inertia invariant (`I = m·(wx² + wy²)/12` for finite mass) cannot
//! be broken from outside.

use nalgebra::{Point2, Rotation2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math;

/// Unique handle for a rigid body in a world.
///
/// The handle is the body's index in the world's body table: it is total,
/// stable for the body's lifetime, and deterministic across runs, which
/// makes it suitable for canonicalizing unordered body pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u32);

impl BodyId {
    /// Create a new body ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the ID as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BodyId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// A rigid box: pose, twist, force accumulators, extents, mass properties.
///
/// # Static bodies
///
/// A body constructed with [`Body::new_static`], or with a mass at or above
/// `f64::MAX`, is immovable: its inverse mass and inverse inertia are zero,
/// it is never integrated, and it contributes no compliance to constraints.
///
/// # Example
///
/// ```
/// use planar_types::Body;
/// use nalgebra::{Point2, Vector2};
///
/// let body = Body::new(Vector2::new(1.0, 1.0), 12.0)
///     .with_position(Point2::new(0.0, 5.0))
///     .with_friction(0.4);
///
/// // I = m (wx^2 + wy^2) / 12 = 12 * 2 / 12 = 2
/// assert_eq!(body.inertia(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body {
    /// Position of the center of mass in world coordinates.
    pub position: Point2<f64>,
    /// Orientation in radians (counter-clockwise).
    pub rotation: f64,
    /// Linear velocity (m/s).
    pub velocity: Vector2<f64>,
    /// Angular velocity (rad/s).
    pub angular_velocity: f64,
    /// Force accumulated since the last step (cleared after integration).
    pub force: Vector2<f64>,
    /// Torque accumulated since the last step (cleared after integration).
    pub torque: f64,
    /// Coulomb friction coefficient (default 0.2).
    pub friction: f64,
    width: Vector2<f64>,
    mass: f64,
    inv_mass: f64,
    inertia: f64,
    inv_inertia: f64,
}

impl Default for Body {
    fn default() -> Self {
        Self::new_static(Vector2::new(1.0, 1.0))
    }
}

impl Body {
    /// Create a dynamic box with the given full extents and mass.
    ///
    /// A mass at or above `f64::MAX` (or infinite) selects the static
    /// convention instead.
    #[must_use]
    pub fn new(width: Vector2<f64>, mass: f64) -> Self {
        let mut body = Self {
            position: Point2::origin(),
            rotation: 0.0,
            velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            force: Vector2::zeros(),
            torque: 0.0,
            friction: 0.2,
            width,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
        };
        body.set(width, mass);
        body
    }

    /// Create an immovable box with the given full extents.
    #[must_use]
    pub fn new_static(width: Vector2<f64>) -> Self {
        Self::new(width, f64::MAX)
    }

    /// Re-initialize shape and inertial properties.
    ///
    /// Resets pose, twist, accumulated forces, and friction to their
    /// defaults, then derives mass properties from the extents:
    /// `I = m·(wx² + wy²)/12` for finite mass, the static convention
    /// (`inv_mass = inv_inertia = 0`) otherwise.
    pub fn set(&mut self, width: Vector2<f64>, mass: f64) {
        self.position = Point2::origin();
        self.rotation = 0.0;
        self.velocity = Vector2::zeros();
        self.angular_velocity = 0.0;
        self.force = Vector2::zeros();
        self.torque = 0.0;
        self.friction = 0.2;
        self.width = width;
        self.mass = mass;

        if mass < f64::MAX {
            self.inv_mass = 1.0 / mass;
            self.inertia = mass * (width.x * width.x + width.y * width.y) / 12.0;
            self.inv_inertia = 1.0 / self.inertia;
        } else {
            self.inv_mass = 0.0;
            self.inertia = f64::MAX;
            self.inv_inertia = 0.0;
        }
    }

    /// Set the position (builder style).
    #[must_use]
    pub fn with_position(mut self, position: Point2<f64>) -> Self {
        self.position = position;
        self
    }

    /// Set the orientation in radians (builder style).
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the linear velocity (builder style).
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector2<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the friction coefficient (builder style).
    #[must_use]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    /// Full extents of the box.
    #[must_use]
    pub fn width(&self) -> Vector2<f64> {
        self.width
    }

    /// Half extents of the box.
    #[must_use]
    pub fn half_extents(&self) -> Vector2<f64> {
        0.5 * self.width
    }

    /// Total mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Inverse mass (0 for static bodies).
    #[must_use]
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Rotational inertia about the center of mass.
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Inverse rotational inertia (0 for static bodies).
    #[must_use]
    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    /// Check if this body is immovable.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// The body's current rotation matrix.
    #[must_use]
    pub fn rotation_matrix(&self) -> Rotation2<f64> {
        math::rotation(self.rotation)
    }

    /// Accumulate a force through the center of mass.
    pub fn apply_force(&mut self, force: Vector2<f64>) {
        self.force += force;
    }

    /// Accumulate a torque.
    pub fn apply_torque(&mut self, torque: f64) {
        self.torque += torque;
    }

    /// Accumulate a force acting at a world-space point.
    ///
    /// The lever arm about the center of mass contributes a torque
    /// `r × f`.
    pub fn apply_force_at_point(&mut self, force: Vector2<f64>, point: Point2<f64>) {
        let r = point - self.position;
        self.force += force;
        self.torque += math::cross(&r, &force);
    }

    /// Zero the accumulated force and torque.
    pub fn clear_forces(&mut self) {
        self.force = Vector2::zeros();
        self.torque = 0.0;
    }

    /// Kinetic energy `½mv² + ½Iω²` (0 for static bodies).
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        if self.is_static() {
            return 0.0;
        }
        0.5 * self.mass * self.velocity.norm_squared()
            + 0.5 * self.inertia * self.angular_velocity * self.angular_velocity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_id_ordering() {
        let a = BodyId::new(3);
        let b = BodyId::new(7);
        assert!(a < b);
        assert_eq!(a.raw(), 3);
        assert_eq!(b.index(), 7);
        assert_eq!(a.to_string(), "Body(3)");
    }

    #[test]
    fn test_box_inertia() {
        let body = Body::new(Vector2::new(1.0, 1.0), 200.0);
        // I = 200 * (1 + 1) / 12
        assert_relative_eq!(body.inertia(), 200.0 * 2.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(body.inv_mass(), 1.0 / 200.0, epsilon = 1e-15);
    }

    #[test]
    fn test_static_convention() {
        let body = Body::new_static(Vector2::new(100.0, 20.0));
        assert!(body.is_static());
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
        assert_eq!(body.inertia(), f64::MAX);
        assert_eq!(body.kinetic_energy(), 0.0);
    }

    #[test]
    fn test_set_resets_state() {
        let mut body = Body::new(Vector2::new(1.0, 1.0), 1.0)
            .with_position(Point2::new(3.0, 4.0))
            .with_velocity(Vector2::new(1.0, 0.0));
        body.apply_torque(2.0);

        body.set(Vector2::new(2.0, 2.0), 8.0);
        assert_eq!(body.position, Point2::origin());
        assert_eq!(body.velocity, Vector2::zeros());
        assert_eq!(body.torque, 0.0);
        assert_relative_eq!(body.inertia(), 8.0 * 8.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_force_at_point_accumulates_torque() {
        let mut body = Body::new(Vector2::new(1.0, 1.0), 1.0);
        // Push +X at a point above the center: negative torque
        body.apply_force_at_point(Vector2::new(1.0, 0.0), Point2::new(0.0, 1.0));
        assert_relative_eq!(body.force.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.torque, -1.0, epsilon = 1e-12);

        body.clear_forces();
        assert_eq!(body.force, Vector2::zeros());
        assert_eq!(body.torque, 0.0);
    }

    #[test]
    fn test_kinetic_energy() {
        let body = Body::new(Vector2::new(1.0, 1.0), 2.0)
            .with_velocity(Vector2::new(3.0, 0.0));
        // 0.5 * 2 * 9 = 9
        assert_relative_eq!(body.kinetic_energy(), 9.0, epsilon = 1e-12);
    }
}
