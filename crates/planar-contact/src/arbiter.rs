//! The per-pair contact cache and impulse kernel.

use planar_collision::ContactPoint;
use planar_types::math::{cross, cross_scalar, tangent};
use planar_types::{Body, BodyId, SolverConfig};

/// Penetration depth tolerated before position correction kicks in.
pub const ALLOWED_PENETRATION: f64 = 0.01;

/// Fraction of excess penetration converted to bias velocity per step.
pub const BIAS_FACTOR: f64 = 0.2;

/// Canonical identity of an unordered body pair.
///
/// The two handles are stored smallest-first, so `ArbiterKey::new(a, b) ==
/// ArbiterKey::new(b, a)` and map lookups succeed regardless of the order
/// the broad phase enumerates the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArbiterKey {
    first: BodyId,
    second: BodyId,
}

impl ArbiterKey {
    /// Canonicalize an unordered pair.
    #[must_use]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a < b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The smaller handle of the pair.
    #[must_use]
    pub fn first(&self) -> BodyId {
        self.first
    }

    /// The larger handle of the pair.
    #[must_use]
    pub fn second(&self) -> BodyId {
        self.second
    }
}

/// Persistent contact manifold for one body pair, plus solver state.
///
/// Holds at most [`MAX_CONTACT_POINTS`](planar_collision::MAX_CONTACT_POINTS)
/// contacts and the pair's combined friction `sqrt(μ1·μ2)`. Created on
/// first contact, updated while the pair stays in contact, removed by the
/// world when the pair separates.
#[derive(Debug, Clone)]
pub struct Arbiter {
    body1: BodyId,
    body2: BodyId,
    contacts: Vec<ContactPoint>,
    friction: f64,
}

impl Arbiter {
    /// Create an arbiter for a fresh contact.
    ///
    /// `body1`/`body2` must be the bodies named by `key`, in canonical
    /// order; the contacts must come from colliding them in that order.
    #[must_use]
    pub fn new(key: ArbiterKey, body1: &Body, body2: &Body, contacts: Vec<ContactPoint>) -> Self {
        Self {
            body1: key.first(),
            body2: key.second(),
            contacts,
            friction: (body1.friction * body2.friction).sqrt(),
        }
    }

    /// The canonical first body of the pair.
    #[must_use]
    pub fn body1(&self) -> BodyId {
        self.body1
    }

    /// The canonical second body of the pair.
    #[must_use]
    pub fn body2(&self) -> BodyId {
        self.body2
    }

    /// The cached contact points.
    #[must_use]
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    /// The pair's combined friction coefficient.
    #[must_use]
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Merge a fresh contact list into the cached manifold.
    ///
    /// New geometric data always wins; only accumulated impulses persist,
    /// and only across contacts whose feature keys match. With warm
    /// starting off, matched contacts restart from zero impulse.
    pub fn update(&mut self, new_contacts: Vec<ContactPoint>, warm_starting: bool) {
        let mut merged = new_contacts;

        for contact in &mut merged {
            let matched = self
                .contacts
                .iter()
                .find(|old| old.feature.key() == contact.feature.key());

            if let Some(old) = matched {
                if warm_starting {
                    contact.normal_impulse = old.normal_impulse;
                    contact.tangent_impulse = old.tangent_impulse;
                    contact.normal_bias_impulse = old.normal_bias_impulse;
                } else {
                    contact.normal_impulse = 0.0;
                    contact.tangent_impulse = 0.0;
                    contact.normal_bias_impulse = 0.0;
                }
            }
        }

        self.contacts = merged;
    }

    /// Per-step setup: effective masses, bias velocity, warm-start impulses.
    ///
    /// `b1`/`b2` must be the bodies this arbiter was created for, in
    /// canonical order.
    pub fn pre_step(&mut self, b1: &mut Body, b2: &mut Body, inv_dt: f64, config: &SolverConfig) {
        let k_bias_factor = if config.position_correction {
            BIAS_FACTOR
        } else {
            0.0
        };

        let (inv_mass1, inv_i1) = (b1.inv_mass(), b1.inv_inertia());
        let (inv_mass2, inv_i2) = (b2.inv_mass(), b2.inv_inertia());

        for c in &mut self.contacts {
            let r1 = c.position - b1.position;
            let r2 = c.position - b2.position;

            // Effective mass along the normal
            let rn1 = r1.dot(&c.normal);
            let rn2 = r2.dot(&c.normal);
            let mut k_normal = inv_mass1 + inv_mass2;
            k_normal +=
                inv_i1 * (r1.dot(&r1) - rn1 * rn1) + inv_i2 * (r2.dot(&r2) - rn2 * rn2);
            c.normal_mass = 1.0 / k_normal;

            // Effective mass along the tangent
            let t = tangent(&c.normal);
            let rt1 = r1.dot(&t);
            let rt2 = r2.dot(&t);
            let mut k_tangent = inv_mass1 + inv_mass2;
            k_tangent +=
                inv_i1 * (r1.dot(&r1) - rt1 * rt1) + inv_i2 * (r2.dot(&r2) - rt2 * rt2);
            c.tangent_mass = 1.0 / k_tangent;

            c.bias = -k_bias_factor * inv_dt * f64::min(0.0, c.separation + ALLOWED_PENETRATION);

            if config.accumulate_impulses {
                // Warm start with the accumulated normal + friction impulse
                let p = c.normal_impulse * c.normal + c.tangent_impulse * t;

                b1.velocity -= inv_mass1 * p;
                b1.angular_velocity -= inv_i1 * cross(&r1, &p);

                b2.velocity += inv_mass2 * p;
                b2.angular_velocity += inv_i2 * cross(&r2, &p);
            }
        }
    }

    /// One Gauss-Seidel sweep over the manifold.
    ///
    /// For each contact: solve the non-penetration constraint along the
    /// normal (accumulator clamped at zero), then re-sample the relative
    /// velocity and solve friction along the tangent (accumulator clamped
    /// to the Coulomb cone).
    pub fn apply_impulse(&mut self, b1: &mut Body, b2: &mut Body, config: &SolverConfig) {
        let (inv_mass1, inv_i1) = (b1.inv_mass(), b1.inv_inertia());
        let (inv_mass2, inv_i2) = (b2.inv_mass(), b2.inv_inertia());

        for c in &mut self.contacts {
            c.r1 = c.position - b1.position;
            c.r2 = c.position - b2.position;

            // Relative velocity at the contact
            let mut dv = b2.velocity + cross_scalar(b2.angular_velocity, &c.r2)
                - b1.velocity
                - cross_scalar(b1.angular_velocity, &c.r1);

            // Normal impulse
            let vn = dv.dot(&c.normal);
            let mut d_pn = c.normal_mass * (-vn + c.bias);

            if config.accumulate_impulses {
                // Clamp the accumulated impulse, not the increment
                let pn0 = c.normal_impulse;
                c.normal_impulse = f64::max(pn0 + d_pn, 0.0);
                d_pn = c.normal_impulse - pn0;
            } else {
                d_pn = f64::max(d_pn, 0.0);
            }

            let pn = d_pn * c.normal;

            b1.velocity -= inv_mass1 * pn;
            b1.angular_velocity -= inv_i1 * cross(&c.r1, &pn);

            b2.velocity += inv_mass2 * pn;
            b2.angular_velocity += inv_i2 * cross(&c.r2, &pn);

            // Relative velocity again, after the normal impulse
            dv = b2.velocity + cross_scalar(b2.angular_velocity, &c.r2)
                - b1.velocity
                - cross_scalar(b1.angular_velocity, &c.r1);

            let t = tangent(&c.normal);
            let vt = dv.dot(&t);
            let mut d_pt = c.tangent_mass * (-vt);

            if config.accumulate_impulses {
                // Coulomb cone on the accumulated friction impulse
                let max_pt = self.friction * c.normal_impulse;
                let old = c.tangent_impulse;
                c.tangent_impulse = (old + d_pt).clamp(-max_pt, max_pt);
                d_pt = c.tangent_impulse - old;
            }

            let pt = d_pt * t;

            b1.velocity -= inv_mass1 * pt;
            b1.angular_velocity -= inv_i1 * cross(&c.r1, &pt);

            b2.velocity += inv_mass2 * pt;
            b2.angular_velocity += inv_i2 * cross(&c.r2, &pt);
        }
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
    use nalgebra::{Point2, Vector2};
    use planar_collision::collide;

    fn overlapping_pair() -> (Body, Body) {
        let a = Body::new(Vector2::new(2.0, 2.0), 8.0);
        let b = Body::new(Vector2::new(2.0, 2.0), 8.0).with_position(Point2::new(1.9, 0.0));
        (a, b)
    }

    fn make_arbiter(a: &Body, b: &Body) -> Arbiter {
        let key = ArbiterKey::new(BodyId::new(0), BodyId::new(1));
        let contacts = collide(a, b);
        assert!(!contacts.is_empty());
        Arbiter::new(key, a, b, contacts)
    }

    #[test]
    fn test_key_symmetry() {
        let a = BodyId::new(4);
        let b = BodyId::new(9);
        assert_eq!(ArbiterKey::new(a, b), ArbiterKey::new(b, a));
        assert_eq!(ArbiterKey::new(a, b).first(), a);
        assert_eq!(ArbiterKey::new(b, a).second(), b);
    }

    #[test]
    fn test_combined_friction_geometric_mean() {
        let (a, mut b) = overlapping_pair();
        b.friction = 0.8;
        let arbiter = make_arbiter(&a, &b);
        assert_relative_eq!(arbiter.friction(), (0.2f64 * 0.8).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_update_preserves_matched_impulses() {
        let (a, b) = overlapping_pair();
        let mut arbiter = make_arbiter(&a, &b);

        // Simulate converged solver state
        for c in &mut arbiter.contacts {
            c.normal_impulse = 3.0;
            c.tangent_impulse = 0.5;
            c.normal_bias_impulse = 0.1;
        }

        let fresh = collide(&a, &b);
        arbiter.update(fresh.clone(), true);
        for c in arbiter.contacts() {
            assert_eq!(c.normal_impulse, 3.0);
            assert_eq!(c.tangent_impulse, 0.5);
            assert_eq!(c.normal_bias_impulse, 0.1);
        }

        // With warm starting off the match restarts cold
        arbiter.update(fresh, false);
        for c in arbiter.contacts() {
            assert_eq!(c.normal_impulse, 0.0);
            assert_eq!(c.tangent_impulse, 0.0);
        }
    }

    #[test]
    fn test_update_drops_unmatched_impulses() {
        let (a, b) = overlapping_pair();
        let mut arbiter = make_arbiter(&a, &b);
        for c in &mut arbiter.contacts {
            c.normal_impulse = 3.0;
        }

        // Contact from the opposite side: the incident edges differ, so no
        // feature matches and impulses start at zero
        let elsewhere = Body::new(Vector2::new(2.0, 2.0), 8.0)
            .with_position(Point2::new(-1.9, 0.0));
        let fresh = collide(&a, &elsewhere);
        assert!(!fresh.is_empty());
        arbiter.update(fresh, true);
        for c in arbiter.contacts() {
            assert_eq!(c.normal_impulse, 0.0);
        }
    }

    #[test]
    fn test_impulse_resolves_approach_velocity() {
        let (mut a, mut b) = overlapping_pair();
        a.velocity = Vector2::new(1.0, 0.0);
        b.velocity = Vector2::new(-1.0, 0.0);

        let mut arbiter = make_arbiter(&a, &b);
        let config = SolverConfig::default().with_position_correction(false);

        arbiter.pre_step(&mut a, &mut b, 60.0, &config);
        for _ in 0..10 {
            arbiter.apply_impulse(&mut a, &mut b, &config);
        }

        // The boxes no longer approach along the normal
        let dv = b.velocity - a.velocity;
        let vn = dv.dot(&arbiter.contacts()[0].normal);
        assert!(vn >= -1e-9, "residual approach velocity {vn}");

        // Normal impulses are non-negative
        for c in arbiter.contacts() {
            assert!(c.normal_impulse >= 0.0);
        }
    }

    #[test]
    fn test_friction_stays_in_coulomb_cone() {
        let (mut a, mut b) = overlapping_pair();
        a.friction = 1.0;
        b.friction = 1.0;
        // Tangential sliding plus slight approach
        b.velocity = Vector2::new(-0.1, 2.0);

        let mut arbiter = make_arbiter(&a, &b);
        let config = SolverConfig::default();

        arbiter.pre_step(&mut a, &mut b, 60.0, &config);
        for _ in 0..10 {
            arbiter.apply_impulse(&mut a, &mut b, &config);
            for c in arbiter.contacts() {
                assert!(
                    c.tangent_impulse.abs() <= arbiter.friction() * c.normal_impulse + 1e-12,
                    "friction impulse escaped the cone"
                );
            }
        }
    }

    #[test]
    fn test_static_body_unmoved_by_impulses() {
        let mut ground = Body::new_static(Vector2::new(100.0, 20.0));
        let mut falling = Body::new(Vector2::new(1.0, 1.0), 200.0)
            .with_position(Point2::new(0.0, 10.49))
            .with_velocity(Vector2::new(0.0, -5.0));

        let key = ArbiterKey::new(BodyId::new(0), BodyId::new(1));
        let contacts = collide(&ground, &falling);
        assert!(!contacts.is_empty());
        let mut arbiter = Arbiter::new(key, &ground, &falling, contacts);

        let config = SolverConfig::default();
        arbiter.pre_step(&mut ground, &mut falling, 60.0, &config);
        for _ in 0..10 {
            arbiter.apply_impulse(&mut ground, &mut falling, &config);
        }

        assert_eq!(ground.velocity, Vector2::zeros());
        assert_eq!(ground.angular_velocity, 0.0);
        // The falling box was stopped (bias may push it slightly outward)
        assert!(falling.velocity.y > -1e-6);
    }
}
