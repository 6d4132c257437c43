//! Point-to-point joint constraints.
//!
//! A [`Joint`] pins a point of one body to a point of another (a revolute
//! connection): the two anchor points, fixed in each body's local frame,
//! are driven to coincide. The constraint is solved at the velocity level
//! by the same sequential-impulse machinery as contacts, with two tuning
//! knobs:
//!
//! - `bias_factor` - Baumgarte coefficient bleeding off positional drift
//!   between the anchors (default 0.2)
//! - `softness` - constraint compliance; zero is rigid, larger values let
//!   the anchors spring apart under load (default 0.0)
//!
//! # Example
//!
//! ```
//! use planar_constraint::Joint;
//! use planar_types::{Body, BodyId};
//! use nalgebra::{Point2, Vector2};
//!
//! let pivot = Body::new_static(Vector2::new(1.0, 1.0));
//! let bob = Body::new(Vector2::new(1.0, 1.0), 100.0)
//!     .with_position(Point2::new(9.0, 11.0));
//!
//! // Pin the bob to the pivot at a world-space anchor
//! let joint = Joint::at_world_anchor(
//!     (BodyId::new(0), &pivot),
//!     (BodyId::new(1), &bob),
//!     Point2::new(0.0, 11.0),
//! );
//!
//! // The bob's local anchor reaches back to the anchor point
//! assert_eq!(joint.local_anchor2(), Vector2::new(-9.0, 0.0));
//! ```

#![doc(html_root_url = "https://docs.rs/planar-constraint/0.2.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod joint;

pub use joint::{Joint, JointId};
