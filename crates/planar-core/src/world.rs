//! World container and the per-step pipeline.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use nalgebra::{Point2, Vector2};

use planar_collision::collide;
use planar_constraint::{Joint, JointId};
use planar_contact::{Arbiter, ArbiterKey};
use planar_types::{Body, BodyId, Result, SimError, SolverConfig};

/// The simulation world.
///
/// Owns the body table, the joint list, and the persistent arbiter map.
/// Bodies and joints are kept in insertion order, so their iteration order
/// is deterministic; the arbiter map is unordered, and because sequential
/// impulses accumulate, differing map iteration orders yield slightly
/// different (equally valid) numerical results.
///
/// Bodies are addressed by [`BodyId`] handles (table indices). Handles stay
/// valid until [`clear`](Self::clear); there is no individual removal, so
/// arbiters and joints can never dangle.
#[derive(Debug, Clone)]
pub struct World {
    bodies: Vec<Body>,
    joints: Vec<Joint>,
    arbiters: HashMap<ArbiterKey, Arbiter>,
    /// Gravitational acceleration applied to dynamic bodies each step.
    pub gravity: Vector2<f64>,
    /// Number of impulse iterations per step.
    pub iterations: usize,
    /// Sequential-impulse solver toggles.
    pub solver: SolverConfig,
}

impl World {
    /// Create a world with the given gravity and solver iteration count.
    #[must_use]
    pub fn new(gravity: Vector2<f64>, iterations: usize) -> Self {
        Self {
            bodies: Vec::new(),
            joints: Vec::new(),
            arbiters: HashMap::new(),
            gravity,
            iterations,
            solver: SolverConfig::default(),
        }
    }

    /// Register a body, returning its handle.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId::new(self.bodies.len() as u32);
        self.bodies.push(body);
        id
    }

    /// Create and register a point-to-point joint anchored at a world point.
    ///
    /// Local anchors are derived from the bodies' current poses. Fails if
    /// either handle is unknown or the two handles are equal.
    pub fn add_joint(
        &mut self,
        body1: BodyId,
        body2: BodyId,
        anchor: Point2<f64>,
    ) -> Result<JointId> {
        if body1 == body2 {
            return Err(SimError::invalid_config(
                "joint endpoints must be distinct bodies",
            ));
        }
        let b1 = self
            .bodies
            .get(body1.index())
            .ok_or(SimError::InvalidBodyId(body1.raw()))?;
        let b2 = self
            .bodies
            .get(body2.index())
            .ok_or(SimError::InvalidBodyId(body2.raw()))?;

        let joint = Joint::at_world_anchor((body1, b1), (body2, b2), anchor);
        self.insert_joint(joint)
    }

    /// Register a pre-built joint (e.g. one tuned with softness).
    ///
    /// Fails if either referenced handle is unknown.
    pub fn insert_joint(&mut self, joint: Joint) -> Result<JointId> {
        for id in [joint.body1(), joint.body2()] {
            if self.bodies.get(id.index()).is_none() {
                return Err(SimError::InvalidBodyId(id.raw()));
            }
        }
        let id = JointId::new(self.joints.len() as u32);
        self.joints.push(joint);
        Ok(id)
    }

    /// Remove all bodies, joints, and cached arbiters.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.arbiters.clear();
    }

    /// Look up a body by handle.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Look up a body mutably by handle.
    #[must_use]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    /// Iterate over all bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Number of registered bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Look up a joint by handle.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.raw() as usize)
    }

    /// Look up a joint mutably by handle.
    #[must_use]
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.raw() as usize)
    }

    /// Iterate over all joints in insertion order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    /// Number of registered joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Look up the arbiter cached for a body pair, in either order.
    #[must_use]
    pub fn arbiter(&self, a: BodyId, b: BodyId) -> Option<&Arbiter> {
        self.arbiters.get(&ArbiterKey::new(a, b))
    }

    /// Iterate over all cached arbiters (unordered).
    pub fn arbiters(&self) -> impl Iterator<Item = (&ArbiterKey, &Arbiter)> {
        self.arbiters.iter()
    }

    /// Total kinetic energy of all dynamic bodies.
    #[must_use]
    pub fn total_kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Advance the simulation by one fixed step.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SingularJointMatrix`] if a joint's effective
    /// mass matrix cannot be inverted (e.g. two static bodies joined); the
    /// step is aborted. No other condition is reported.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };

        tracing::trace!(
            bodies = self.bodies.len(),
            joints = self.joints.len(),
            arbiters = self.arbiters.len(),
            dt,
            "step"
        );

        // Determine overlapping pairs and refresh contact manifolds
        self.broad_phase();

        // Integrate forces (semi-implicit: velocities first)
        let gravity = self.gravity;
        for body in &mut self.bodies {
            if body.is_static() {
                continue;
            }
            body.velocity += dt * (gravity + body.inv_mass() * body.force);
            body.angular_velocity += dt * body.inv_inertia() * body.torque;
        }

        // Pre-step all constraints
        let solver = self.solver;
        for arbiter in self.arbiters.values_mut() {
            let (b1, b2) = body_pair_mut(&mut self.bodies, arbiter.body1(), arbiter.body2());
            arbiter.pre_step(b1, b2, inv_dt, &solver);
        }
        for (index, joint) in self.joints.iter_mut().enumerate() {
            let (b1, b2) = body_pair_mut(&mut self.bodies, joint.body1(), joint.body2());
            if let Err(err) = joint.pre_step(b1, b2, inv_dt, &solver) {
                tracing::warn!(joint = index, %err, "aborting step");
                return Err(err);
            }
        }

        // Impulse iterations
        for _ in 0..self.iterations {
            for arbiter in self.arbiters.values_mut() {
                let (b1, b2) =
                    body_pair_mut(&mut self.bodies, arbiter.body1(), arbiter.body2());
                arbiter.apply_impulse(b1, b2, &solver);
            }
            for joint in &mut self.joints {
                let (b1, b2) = body_pair_mut(&mut self.bodies, joint.body1(), joint.body2());
                joint.apply_impulse(b1, b2);
            }
        }

        // Integrate positions and reset accumulators
        for body in &mut self.bodies {
            body.position += dt * body.velocity;
            body.rotation += dt * body.angular_velocity;
            body.clear_forces();
        }

        Ok(())
    }

    /// All-pairs broad phase: refresh, create, or retire arbiters.
    fn broad_phase(&mut self) {
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                if self.bodies[i].is_static() && self.bodies[j].is_static() {
                    continue;
                }

                let key = ArbiterKey::new(BodyId::new(i as u32), BodyId::new(j as u32));
                let body1 = &self.bodies[key.first().index()];
                let body2 = &self.bodies[key.second().index()];

                let contacts = collide(body1, body2);
                if contacts.is_empty() {
                    self.arbiters.remove(&key);
                } else {
                    match self.arbiters.entry(key) {
                        Entry::Occupied(mut entry) => {
                            entry.get_mut().update(contacts, self.solver.warm_starting);
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(Arbiter::new(key, body1, body2, contacts));
                        }
                    }
                }
            }
        }
    }
}

/// Split-borrow two distinct bodies out of the table.
fn body_pair_mut(bodies: &mut [Body], a: BodyId, b: BodyId) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b, "constraint connects a body to itself");
    if a < b {
        let (head, tail) = bodies.split_at_mut(b.index());
        (&mut head[a.index()], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(a.index());
        let (second, first) = (&mut head[b.index()], &mut tail[0]);
        (first, second)
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

    fn test_world() -> World {
        World::new(Vector2::new(0.0, -10.0), 10)
    }

    fn unit_box(x: f64, y: f64) -> Body {
        Body::new(Vector2::new(1.0, 1.0), 1.0).with_position(Point2::new(x, y))
    }

    #[test]
    fn test_add_body_sequential_handles() {
        let mut world = test_world();
        let a = world.add_body(unit_box(0.0, 0.0));
        let b = world.add_body(unit_box(5.0, 0.0));
        assert_eq!(a, BodyId::new(0));
        assert_eq!(b, BodyId::new(1));
        assert_eq!(world.body_count(), 2);
        assert!(world.body(b).is_some());
        assert!(world.body(BodyId::new(2)).is_none());
    }

    #[test]
    fn test_add_joint_validates_handles() {
        let mut world = test_world();
        let a = world.add_body(unit_box(0.0, 0.0));
        let b = world.add_body(unit_box(2.0, 0.0));

        assert!(world.add_joint(a, b, Point2::new(1.0, 0.0)).is_ok());
        assert_eq!(
            world.add_joint(a, BodyId::new(9), Point2::origin()),
            Err(SimError::InvalidBodyId(9))
        );
        assert!(world.add_joint(a, a, Point2::origin()).is_err());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut world = test_world();
        let a = world.add_body(unit_box(0.0, 0.0));
        let b = world.add_body(unit_box(0.5, 0.0));
        world.add_joint(a, b, Point2::origin()).expect("valid joint");
        world.step(1.0 / 60.0).expect("step should succeed");

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.arbiters().count(), 0);

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.arbiters().count(), 0);
    }

    #[test]
    fn test_broad_phase_creates_and_retires_arbiters() {
        let mut world = test_world();
        world.gravity = Vector2::zeros();
        let a = world.add_body(unit_box(0.0, 0.0));
        let b = world.add_body(unit_box(0.9, 0.0));

        world.step(1.0 / 60.0).expect("step should succeed");
        assert!(world.arbiter(a, b).is_some());
        // The lookup is symmetric in the pair order
        assert!(world.arbiter(b, a).is_some());

        // Teleport one body far away: the next step retires the pair
        if let Some(body) = world.body_mut(b) {
            body.position = Point2::new(100.0, 0.0);
        }
        world.step(1.0 / 60.0).expect("step should succeed");
        assert!(world.arbiter(a, b).is_none());
    }

    #[test]
    fn test_static_pair_skipped() {
        let mut world = test_world();
        let a = world.add_body(Body::new_static(Vector2::new(1.0, 1.0)));
        let b = world.add_body(
            Body::new_static(Vector2::new(1.0, 1.0)).with_position(Point2::new(0.5, 0.0)),
        );

        world.step(1.0 / 60.0).expect("step should succeed");
        assert!(world.arbiter(a, b).is_none());
    }

    #[test]
    fn test_free_fall_velocity_is_exact() {
        let mut world = test_world();
        let id = world.add_body(unit_box(0.0, 100.0));

        let dt = 1.0 / 60.0;
        for _ in 0..30 {
            world.step(dt).expect("step should succeed");
        }

        let body = world.body(id).expect("body exists");
        assert_relative_eq!(body.velocity.y, -10.0 * 30.0 * dt, epsilon = 1e-9);
    }

    #[test]
    fn test_force_accumulators_cleared_after_step() {
        let mut world = test_world();
        world.gravity = Vector2::zeros();
        let id = world.add_body(unit_box(0.0, 0.0));

        world
            .body_mut(id)
            .expect("body exists")
            .apply_force(Vector2::new(60.0, 0.0));
        world.step(1.0 / 60.0).expect("step should succeed");

        let body = world.body(id).expect("body exists");
        assert_relative_eq!(body.velocity.x, 1.0, epsilon = 1e-12);
        assert_eq!(body.force, Vector2::zeros());
        assert_eq!(body.torque, 0.0);
    }

    #[test]
    fn test_singular_joint_aborts_step() {
        let mut world = test_world();
        let a = world.add_body(Body::new_static(Vector2::new(1.0, 1.0)));
        let b = world.add_body(
            Body::new_static(Vector2::new(1.0, 1.0)).with_position(Point2::new(5.0, 0.0)),
        );
        world.add_joint(a, b, Point2::new(2.5, 0.0)).expect("valid joint");

        let err = world.step(1.0 / 60.0).unwrap_err();
        assert!(err.is_singular_joint());
    }

    #[test]
    fn test_zero_dt_is_a_no_op_for_motion() {
        let mut world = test_world();
        let id = world.add_body(unit_box(0.0, 5.0));

        world.step(0.0).expect("step should succeed");
        let body = world.body(id).expect("body exists");
        assert_eq!(body.position, Point2::new(0.0, 5.0));
        assert_eq!(body.velocity, Vector2::zeros());
    }

    #[test]
    fn test_body_pair_mut_orders_by_argument() {
        let mut bodies = vec![unit_box(0.0, 0.0), unit_box(1.0, 0.0), unit_box(2.0, 0.0)];

        let (first, second) = body_pair_mut(&mut bodies, BodyId::new(2), BodyId::new(0));
        assert_eq!(first.position.x, 2.0);
        assert_eq!(second.position.x, 0.0);
    }

    #[test]
    fn test_kinetic_energy_sums_dynamic_bodies() {
        let mut world = test_world();
        world.add_body(Body::new_static(Vector2::new(10.0, 1.0)));
        let id = world.add_body(unit_box(0.0, 3.0));
        world
            .body_mut(id)
            .expect("body exists")
            .velocity = Vector2::new(2.0, 0.0);

        // 0.5 * 1 * 4
        assert_relative_eq!(world.total_kinetic_energy(), 2.0, epsilon = 1e-12);
    }
}
