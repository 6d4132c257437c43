//! The point-to-point joint and its impulse kernel.

use nalgebra::{Matrix2, Point2, Vector2};

use planar_types::math::{cross, cross_scalar};
use planar_types::{Body, BodyId, Result, SimError, SolverConfig};

/// Unique handle for a joint in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JointId(pub u32);

impl JointId {
    /// Create a new joint ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Joint({})", self.0)
    }
}

/// A 2-DOF point-to-point constraint between two bodies.
///
/// The local anchors are derived once, from the body poses at set-up; the
/// per-step state (rotated anchors, effective mass matrix, bias) is
/// recomputed in [`pre_step`](Self::pre_step), and the accumulated impulse
/// `P` is warm-started across frames.
#[derive(Debug, Clone)]
pub struct Joint {
    body1: BodyId,
    body2: BodyId,
    local_anchor1: Vector2<f64>,
    local_anchor2: Vector2<f64>,
    r1: Vector2<f64>,
    r2: Vector2<f64>,
    mass: Matrix2<f64>,
    bias: Vector2<f64>,
    accumulated_impulse: Vector2<f64>,
    /// Baumgarte positional-correction coefficient (default 0.2).
    pub bias_factor: f64,
    /// Constraint compliance; 0 is rigid (default 0.0).
    pub softness: f64,
}

impl Joint {
    /// Create a joint from pre-computed local anchors.
    #[must_use]
    pub fn new(
        body1: BodyId,
        body2: BodyId,
        local_anchor1: Vector2<f64>,
        local_anchor2: Vector2<f64>,
    ) -> Self {
        Self {
            body1,
            body2,
            local_anchor1,
            local_anchor2,
            r1: Vector2::zeros(),
            r2: Vector2::zeros(),
            mass: Matrix2::zeros(),
            bias: Vector2::zeros(),
            accumulated_impulse: Vector2::zeros(),
            bias_factor: 0.2,
            softness: 0.0,
        }
    }

    /// Create a joint pinning both bodies to a world-space anchor.
    ///
    /// The local anchors are derived from the bodies' current poses, so the
    /// constraint is exactly satisfied at set-up.
    #[must_use]
    pub fn at_world_anchor(
        body1: (BodyId, &Body),
        body2: (BodyId, &Body),
        anchor: Point2<f64>,
    ) -> Self {
        let rot1_t = body1.1.rotation_matrix().transpose();
        let rot2_t = body2.1.rotation_matrix().transpose();

        let local_anchor1 = rot1_t * (anchor - body1.1.position);
        let local_anchor2 = rot2_t * (anchor - body2.1.position);

        Self::new(body1.0, body2.0, local_anchor1, local_anchor2)
    }

    /// Set the constraint compliance (builder style).
    #[must_use]
    pub fn with_softness(mut self, softness: f64) -> Self {
        self.softness = softness;
        self
    }

    /// Set the Baumgarte coefficient (builder style).
    #[must_use]
    pub fn with_bias_factor(mut self, bias_factor: f64) -> Self {
        self.bias_factor = bias_factor;
        self
    }

    /// The first connected body.
    #[must_use]
    pub fn body1(&self) -> BodyId {
        self.body1
    }

    /// The second connected body.
    #[must_use]
    pub fn body2(&self) -> BodyId {
        self.body2
    }

    /// The anchor in the first body's local frame.
    #[must_use]
    pub fn local_anchor1(&self) -> Vector2<f64> {
        self.local_anchor1
    }

    /// The anchor in the second body's local frame.
    #[must_use]
    pub fn local_anchor2(&self) -> Vector2<f64> {
        self.local_anchor2
    }

    /// The accumulated constraint impulse.
    #[must_use]
    pub fn accumulated_impulse(&self) -> Vector2<f64> {
        self.accumulated_impulse
    }

    /// Both anchor points in world space, given the connected bodies.
    ///
    /// A rigid joint at rest has the two points coincident; the distance
    /// between them is the constraint's positional drift.
    #[must_use]
    pub fn world_anchors(&self, b1: &Body, b2: &Body) -> (Point2<f64>, Point2<f64>) {
        let p1 = b1.position + b1.rotation_matrix() * self.local_anchor1;
        let p2 = b2.position + b2.rotation_matrix() * self.local_anchor2;
        (p1, p2)
    }

    /// Per-step setup: rotated anchors, effective mass, bias, warm start.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SingularJointMatrix`] when the effective mass
    /// matrix cannot be inverted; with zero softness that means neither
    /// body has compliance (e.g. two static bodies joined), which is a
    /// programming error and aborts the step.
    pub fn pre_step(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        inv_dt: f64,
        config: &SolverConfig,
    ) -> Result<()> {
        let rot1 = b1.rotation_matrix();
        let rot2 = b2.rotation_matrix();

        self.r1 = rot1 * self.local_anchor1;
        self.r2 = rot2 * self.local_anchor2;

        // deltaV = deltaV0 + K * impulse
        // K = (1/m1 + 1/m2) I
        //   + invI1 [ r1.y² , -r1.x r1.y ; -r1.x r1.y , r1.x² ]
        //   + invI2 [ r2.y² , -r2.x r2.y ; -r2.x r2.y , r2.x² ]
        let inv_mass_sum = b1.inv_mass() + b2.inv_mass();
        let k1 = Matrix2::new(inv_mass_sum, 0.0, 0.0, inv_mass_sum);
        let k2 = b1.inv_inertia()
            * Matrix2::new(
                self.r1.y * self.r1.y,
                -self.r1.x * self.r1.y,
                -self.r1.x * self.r1.y,
                self.r1.x * self.r1.x,
            );
        let k3 = b2.inv_inertia()
            * Matrix2::new(
                self.r2.y * self.r2.y,
                -self.r2.x * self.r2.y,
                -self.r2.x * self.r2.y,
                self.r2.x * self.r2.x,
            );

        let mut k = k1 + k2 + k3;
        k[(0, 0)] += self.softness;
        k[(1, 1)] += self.softness;

        self.mass = k.try_inverse().ok_or(SimError::SingularJointMatrix)?;

        let p1 = b1.position + self.r1;
        let p2 = b2.position + self.r2;
        let dp = p2 - p1;

        self.bias = if config.position_correction {
            -self.bias_factor * inv_dt * dp
        } else {
            Vector2::zeros()
        };

        if config.warm_starting {
            let p = self.accumulated_impulse;

            b1.velocity -= b1.inv_mass() * p;
            b1.angular_velocity -= b1.inv_inertia() * cross(&self.r1, &p);

            b2.velocity += b2.inv_mass() * p;
            b2.angular_velocity += b2.inv_inertia() * cross(&self.r2, &p);
        } else {
            self.accumulated_impulse = Vector2::zeros();
        }

        Ok(())
    }

    /// One velocity-correction impulse toward the constraint manifold.
    pub fn apply_impulse(&mut self, b1: &mut Body, b2: &mut Body) {
        let dv = b2.velocity + cross_scalar(b2.angular_velocity, &self.r2)
            - b1.velocity
            - cross_scalar(b1.angular_velocity, &self.r1);

        let impulse = self.mass * (self.bias - dv - self.softness * self.accumulated_impulse);

        b1.velocity -= b1.inv_mass() * impulse;
        b1.angular_velocity -= b1.inv_inertia() * cross(&self.r1, &impulse);

        b2.velocity += b2.inv_mass() * impulse;
        b2.angular_velocity += b2.inv_inertia() * cross(&self.r2, &impulse);

        self.accumulated_impulse += impulse;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn pivot_and_bob() -> (Body, Body, Joint) {
        let pivot = Body::new_static(Vector2::new(1.0, 1.0));
        let bob = Body::new(Vector2::new(1.0, 1.0), 100.0)
            .with_position(Point2::new(9.0, 11.0));
        let joint = Joint::at_world_anchor(
            (BodyId::new(0), &pivot),
            (BodyId::new(1), &bob),
            Point2::new(0.0, 11.0),
        );
        (pivot, bob, joint)
    }

    #[test]
    fn test_local_anchors_from_world_anchor() {
        let (pivot, bob, joint) = pivot_and_bob();
        assert_eq!(joint.local_anchor1(), Vector2::new(0.0, 11.0));
        assert_eq!(joint.local_anchor2(), Vector2::new(-9.0, 0.0));

        // The derived anchors coincide at set-up
        let (p1, p2) = joint.world_anchors(&pivot, &bob);
        assert_relative_eq!((p2 - p1).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_local_anchor_respects_rotation() {
        let rotated = Body::new(Vector2::new(1.0, 1.0), 1.0)
            .with_position(Point2::new(1.0, 0.0))
            .with_rotation(FRAC_PI_2);
        let other = Body::new(Vector2::new(1.0, 1.0), 1.0);

        let joint = Joint::at_world_anchor(
            (BodyId::new(0), &rotated),
            (BodyId::new(1), &other),
            Point2::new(1.0, 1.0),
        );

        // World offset (0, 1) pulled back through a 90-degree rotation
        let local = joint.local_anchor1();
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_static_bodies_singular() {
        let mut a = Body::new_static(Vector2::new(1.0, 1.0));
        let mut b = Body::new_static(Vector2::new(1.0, 1.0));
        let mut joint = Joint::at_world_anchor(
            (BodyId::new(0), &a),
            (BodyId::new(1), &b),
            Point2::origin(),
        );

        let err = joint
            .pre_step(&mut a, &mut b, 60.0, &SolverConfig::default())
            .unwrap_err();
        assert!(err.is_singular_joint());
    }

    #[test]
    fn test_impulse_cancels_relative_anchor_velocity() {
        let (mut pivot, mut bob, mut joint) = pivot_and_bob();
        bob.velocity = Vector2::new(0.0, -3.0);

        let config = SolverConfig::default().with_position_correction(false);
        joint
            .pre_step(&mut pivot, &mut bob, 60.0, &config)
            .expect("pre_step should succeed");
        for _ in 0..10 {
            joint.apply_impulse(&mut pivot, &mut bob);
        }

        // Relative velocity at the anchors is driven to zero
        let dv = bob.velocity + cross_scalar(bob.angular_velocity, &joint.r2)
            - pivot.velocity
            - cross_scalar(pivot.angular_velocity, &joint.r1);
        assert_relative_eq!(dv.norm(), 0.0, epsilon = 1e-9);

        // The static pivot never moves
        assert_eq!(pivot.velocity, Vector2::zeros());
        assert_eq!(pivot.angular_velocity, 0.0);
    }

    #[test]
    fn test_warm_starting_toggle() {
        let (mut pivot, mut bob, mut joint) = pivot_and_bob();
        bob.velocity = Vector2::new(0.0, -3.0);

        let config = SolverConfig::default();
        joint
            .pre_step(&mut pivot, &mut bob, 60.0, &config)
            .expect("pre_step should succeed");
        joint.apply_impulse(&mut pivot, &mut bob);
        assert!(joint.accumulated_impulse().norm() > 0.0);

        // With warm starting off, the next pre-step resets the accumulator
        let cold = config.with_warm_starting(false);
        joint
            .pre_step(&mut pivot, &mut bob, 60.0, &cold)
            .expect("pre_step should succeed");
        assert_eq!(joint.accumulated_impulse(), Vector2::zeros());
    }

    #[test]
    fn test_softness_relaxes_constraint() {
        let (mut pivot, mut bob, mut joint) = pivot_and_bob();
        joint = joint.with_softness(0.5);
        bob.velocity = Vector2::new(0.0, -3.0);

        let config = SolverConfig::default().with_position_correction(false);
        joint
            .pre_step(&mut pivot, &mut bob, 60.0, &config)
            .expect("pre_step should succeed");
        joint.apply_impulse(&mut pivot, &mut bob);

        // A soft joint applies a weaker first impulse than a rigid one
        let soft_impulse = joint.accumulated_impulse().norm();

        let (mut pivot2, mut bob2, mut rigid) = pivot_and_bob();
        bob2.velocity = Vector2::new(0.0, -3.0);
        rigid
            .pre_step(&mut pivot2, &mut bob2, 60.0, &config)
            .expect("pre_step should succeed");
        rigid.apply_impulse(&mut pivot2, &mut bob2);

        assert!(soft_impulse < rigid.accumulated_impulse().norm());
    }
}
