//! Persistent contact manifolds and the sequential-impulse contact solver.
//!
//! An [`Arbiter`] caches the contact manifold for one unordered body pair
//! across frames. Persistence is what makes warm starting work: when the
//! collider re-detects a contact whose [feature](planar_collision::FeaturePair)
//! matches a cached one, the accumulated impulses carry over and the solver
//! starts the new frame close to the converged solution.
//!
//! Per step the world drives each arbiter through two phases:
//!
//! 1. [`Arbiter::pre_step`] - compute effective masses and the Baumgarte
//!    bias, and (when warm starting) apply the cached impulses up front.
//! 2. [`Arbiter::apply_impulse`] - one Gauss-Seidel sweep over the
//!    contacts: a non-penetration impulse clamped at zero, then a friction
//!    impulse clamped to the Coulomb cone `|Pt| ≤ μ·Pn`.
//!
//! The world calls phase 2 `iterations` times per step.

#![doc(html_root_url = "https://docs.rs/planar-contact/0.2.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod arbiter;

pub use arbiter::{Arbiter, ArbiterKey, ALLOWED_PENETRATION, BIAS_FACTOR};
