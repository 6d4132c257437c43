//! Core types for the planar 2D rigid-body engine.
//!
//! This crate provides the foundational types shared by the whole workspace:
//!
//! - [`Body`] - rigid box state (pose, twist, force accumulators, inertia)
//! - [`BodyId`] - stable handle into a world's body table
//! - [`SolverConfig`] - sequential-impulse solver toggles
//! - [`SimError`] - error type for fallible engine operations
//! - [`math`] - the 2D cross-product family the solver kernels use
//!
//! # Design Philosophy
//!
//! These types are **pure data** plus the small amount of behavior that
//! protects their invariants (a body's inertia always matches its mass and
//! extents). They have no knowledge of collision detection or constraint
//! solving; those live in the crates layered on top.
//!
//! # Coordinate System
//!
//! - X: right
//! - Y: up
//! - Positive rotation: counter-clockwise
//!
//! # Example
//!
//! ```
//! use planar_types::Body;
//! use nalgebra::{Point2, Vector2};
//!
//! // A dynamic 1x1 box and an immovable ground slab
//! let falling = Body::new(Vector2::new(1.0, 1.0), 200.0)
//!     .with_position(Point2::new(0.0, 4.0));
//! let ground = Body::new_static(Vector2::new(100.0, 20.0));
//!
//! assert!(!falling.is_static());
//! assert_eq!(ground.inv_mass(), 0.0);
//! ```

#![doc(html_root_url = "https://docs.rs/planar-types/0.2.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod error;
pub mod math;

pub use body::{Body, BodyId};
pub use config::SolverConfig;
pub use error::SimError;

// Re-export math types for convenience
pub use nalgebra::{Matrix2, Point2, Rotation2, Vector2};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_dynamic_body_roundtrip() {
        let body = Body::new(Vector2::new(2.0, 1.0), 6.0);
        assert_eq!(body.mass(), 6.0);
        assert!(body.inv_mass() > 0.0);
        assert!(!body.is_static());
    }

    #[test]
    fn test_default_solver_config() {
        let config = SolverConfig::default();
        assert!(config.accumulate_impulses);
        assert!(config.warm_starting);
        assert!(config.position_correction);
    }
}
