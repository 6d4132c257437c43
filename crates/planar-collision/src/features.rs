//! Contact feature identification.
//!
//! Box vertex and edge numbering:
//!
//! ```text
//!         ^ y
//!         |
//!         e1
//!    v2 ------ v1
//!     |        |
//!  e2 |        | e4  --> x
//!     |        |
//!    v3 ------ v4
//!         e3
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier for one of the four edges of a box (or no edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum EdgeNumber {
    /// No edge (cleared by clipping).
    #[default]
    None = 0,
    /// Top edge.
    Edge1 = 1,
    /// Left edge.
    Edge2 = 2,
    /// Bottom edge.
    Edge3 = 3,
    /// Right edge.
    Edge4 = 4,
}

/// The four edges that produced a contact point.
///
/// Edges tagged "1" belong to the first (reference-ordered) body, edges
/// tagged "2" to the second. The packed [`key`](Self::key) is the contact's
/// identity across frames: the arbiter matches new contacts against cached
/// ones by key to carry accumulated impulses over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaturePair {
    /// Incoming edge on the first body.
    pub in_edge1: EdgeNumber,
    /// Outgoing edge on the first body.
    pub out_edge1: EdgeNumber,
    /// Incoming edge on the second body.
    pub in_edge2: EdgeNumber,
    /// Outgoing edge on the second body.
    pub out_edge2: EdgeNumber,
}

impl FeaturePair {
    /// Pack the four edge identifiers into a 32-bit key.
    #[must_use]
    pub fn key(&self) -> u32 {
        (self.in_edge1 as u32)
            | ((self.out_edge1 as u32) << 8)
            | ((self.in_edge2 as u32) << 16)
            | ((self.out_edge2 as u32) << 24)
    }

    /// Swap the "1" and "2" edge pairs.
    ///
    /// Used when the reference box was the second body, so that feature
    /// identity is always expressed with "1" referring to the canonical
    /// first body.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge1, &mut self.in_edge2);
        std::mem::swap(&mut self.out_edge1, &mut self.out_edge2);
    }
}
