//! Error types for engine operations.

use thiserror::Error;

/// Errors that can occur during simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Invalid body ID referenced.
    #[error("invalid body ID: {0}")]
    InvalidBodyId(u32),

    /// A joint's effective mass matrix is singular.
    ///
    /// This arises from mutually inconsistent masses, e.g. a joint between
    /// two static bodies, and is treated as a programming error: the step
    /// is aborted.
    #[error("joint mass matrix is singular (do the joined bodies have any compliance?)")]
    SingularJointMatrix,

    /// Invalid mass properties.
    #[error("invalid mass properties: {reason}")]
    InvalidMass {
        /// Description of what's wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl SimError {
    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMass {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a singular joint matrix error.
    #[must_use]
    pub fn is_singular_joint(&self) -> bool {
        matches!(self, Self::SingularJointMatrix { .. })
    }
}
