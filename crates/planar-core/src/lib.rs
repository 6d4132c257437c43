//! The simulation world and stepping loop.
//!
//! This crate ties the engine together: the [`World`] owns the bodies,
//! joints, and the persistent arbiter map, and advances the simulation by
//! fixed-step semi-implicit Euler integration with a sequential-impulse
//! constraint solver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         World                               │
//! │  bodies, joints, arbiter map, gravity, solver config        │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ step(dt)
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  broad phase (all pairs) → collide → arbiter merge          │
//! │  integrate forces                                           │
//! │  arbiter/joint pre-step                                     │
//! │  N × { arbiter/joint apply-impulse }                        │
//! │  integrate positions, clear forces                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use planar_core::World;
//! use planar_types::Body;
//! use nalgebra::{Point2, Vector2};
//!
//! let mut world = World::new(Vector2::new(0.0, -10.0), 10);
//!
//! world.add_body(Body::new_static(Vector2::new(100.0, 20.0))
//!     .with_position(Point2::new(0.0, -10.0)));
//! let falling = world.add_body(Body::new(Vector2::new(1.0, 1.0), 200.0)
//!     .with_position(Point2::new(0.0, 4.0)));
//!
//! // One second at 60 Hz: the box lands on the ground slab
//! for _ in 0..60 {
//!     world.step(1.0 / 60.0).unwrap();
//! }
//!
//! let body = world.body(falling).unwrap();
//! assert!(body.position.y > 0.0);
//! ```

#![doc(html_root_url = "https://docs.rs/planar-core/0.2.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::cast_possible_truncation,  // body/joint counts fit u32 handles
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod world;

pub use world::World;

// Re-export the engine surface so hosts can depend on planar-core alone
pub use planar_collision::{
    collide, ContactPoint, EdgeNumber, FeaturePair, SeparatingAxis, MAX_CONTACT_POINTS,
};
pub use planar_constraint::{Joint, JointId};
pub use planar_contact::{Arbiter, ArbiterKey, ALLOWED_PENETRATION, BIAS_FACTOR};
pub use planar_types::{Body, BodyId, Result, SimError, SolverConfig};
