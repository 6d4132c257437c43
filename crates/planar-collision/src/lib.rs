//! Box-box collision detection.
//!
//! This crate implements the narrow phase of the engine: an oriented-box vs
//! oriented-box separating-axis test that produces up to two persistent
//! contact points by clipping the incident edge of one box against the
//! reference face of the other.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Separating-axis test over the four face axes of A and B  │
//! │   any positive face separation → no contact              │
//! └────────────────────────────┬─────────────────────────────┘
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ Reference face selection (biased toward the current axis)│
//! │ Incident edge: face of the other box most antiparallel   │
//! │ to the reference normal                                  │
//! └────────────────────────────┬─────────────────────────────┘
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ Clip incident edge against the reference face's two side │
//! │ planes; keep clipped vertices behind the front plane     │
//! └────────────────────────────┬─────────────────────────────┘
//!                              ▼
//!              0-2 contacts tagged with feature pairs
//! ```
//!
//! Each emitted [`ContactPoint`] carries a [`FeaturePair`] naming the box
//! edges that produced it. The tag is stable while the underlying geometric
//! feature persists, which is what lets the arbiter carry accumulated
//! impulses across frames.
//!
//! # Example
//!
//! ```
//! use planar_collision::collide;
//! use planar_types::Body;
//! use nalgebra::{Point2, Vector2};
//!
//! let a = Body::new(Vector2::new(2.0, 2.0), 8.0);
//! let b = Body::new(Vector2::new(2.0, 2.0), 8.0)
//!     .with_position(Point2::new(1.5, 0.0));
//!
//! let contacts = collide(&a, &b);
//! assert_eq!(contacts.len(), 2);
//! // The normal points from A toward B
//! assert!(contacts[0].normal.x > 0.0);
//! assert!(contacts.iter().all(|c| c.separation <= 0.0));
//! ```

#![doc(html_root_url = "https://docs.rs/planar-collision/0.2.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

mod clip;
mod collide;
mod contact;
mod features;

pub use collide::{collide, SeparatingAxis};
pub use contact::{ContactPoint, MAX_CONTACT_POINTS};
pub use features::{EdgeNumber, FeaturePair};
