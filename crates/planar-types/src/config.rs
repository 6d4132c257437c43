//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Toggles for the sequential-impulse solver.
///
/// These are held by the world (not process globals) and read each step.
/// They are intended to be chosen once at startup: flipping
/// `warm_starting` or `accumulate_impulses` mid-simulation invalidates the
/// impulses cached in persistent contacts, so the first step after a flip
/// converges as if from cold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Accumulate and clamp impulses across iterations (normal impulses at
    /// zero, friction impulses inside the Coulomb cone).
    pub accumulate_impulses: bool,
    /// Carry accumulated impulses across frames through matched contact
    /// features and apply them ahead of iteration.
    pub warm_starting: bool,
    /// Add a Baumgarte bias term that bleeds off penetration beyond the
    /// allowed slop.
    pub position_correction: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            accumulate_impulses: true,
            warm_starting: true,
            position_correction: true,
        }
    }
}

impl SolverConfig {
    /// Enable or disable impulse accumulation.
    #[must_use]
    pub const fn with_accumulate_impulses(mut self, enable: bool) -> Self {
        self.accumulate_impulses = enable;
        self
    }

    /// Enable or disable warm starting.
    #[must_use]
    pub const fn with_warm_starting(mut self, enable: bool) -> Self {
        self.warm_starting = enable;
        self
    }

    /// Enable or disable position correction.
    #[must_use]
    pub const fn with_position_correction(mut self, enable: bool) -> Self {
        self.position_correction = enable;
        self
    }
}
