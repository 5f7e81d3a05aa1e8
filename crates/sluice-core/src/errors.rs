//! Unified error type for sluice operations
//!
//! One flat enum covers the whole taxonomy: API misuse, lifecycle
//! violations, policy rejections, and dispatch failures. Variants carry
//! only message strings so the type stays `Clone` and serializable.

use serde::{Deserialize, Serialize};

/// Unified error type for all sluice operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SluiceError {
    /// API misuse, e.g. requesting an effect from inside a gate callback.
    /// Always a programming bug, never recovered.
    #[error("usage error: {message}")]
    Usage {
        /// Description of the misuse
        message: String,
    },

    /// A side effect was requested with no active boundary. Intentional:
    /// there is no implicit default boundary, every request must occur
    /// inside an explicitly entered boundary's lifetime.
    #[error("no active boundary: {message}")]
    NoBoundary {
        /// Description of the rejected request
        message: String,
    },

    /// Operation invalid for the boundary's current lifecycle state
    /// (double release, release while active, admit after terminal).
    #[error("boundary state error: {message}")]
    State {
        /// Description of the lifecycle violation
        message: String,
    },

    /// A gate explicitly rejected an intent. Expected, user-facing,
    /// propagates to the `request()` caller.
    #[error("policy violation: {message}")]
    PolicyViolation {
        /// Reason the gate gave for the rejection
        message: String,
    },

    /// A dispatcher failed while executing an intent. Propagates
    /// immediately from release; remaining intents are not attempted.
    #[error("dispatch failed: {message}")]
    Dispatch {
        /// Description of the dispatch failure
        message: String,
    },
}

impl SluiceError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a no-active-boundary error
    pub fn no_boundary(message: impl Into<String>) -> Self {
        Self::NoBoundary {
            message: message.into(),
        }
    }

    /// Create a lifecycle state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a policy violation
    pub fn policy_violation(message: impl Into<String>) -> Self {
        Self::PolicyViolation {
            message: message.into(),
        }
    }

    /// Create a dispatch error
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }

    /// True if this error is a gate rejection rather than a programming bug
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation { .. })
    }
}

/// Result alias used throughout sluice
pub type SluiceResult<T> = Result<T, SluiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn constructors_produce_matching_variants() {
        assert_matches!(SluiceError::usage("x"), SluiceError::Usage { .. });
        assert_matches!(SluiceError::no_boundary("x"), SluiceError::NoBoundary { .. });
        assert_matches!(SluiceError::state("x"), SluiceError::State { .. });
        assert_matches!(
            SluiceError::policy_violation("x"),
            SluiceError::PolicyViolation { .. }
        );
        assert_matches!(SluiceError::dispatch("x"), SluiceError::Dispatch { .. });
    }

    #[test]
    fn display_includes_message() {
        let err = SluiceError::policy_violation("send_email is blocked");
        assert_eq!(err.to_string(), "policy violation: send_email is blocked");
        assert!(err.is_policy_violation());
        assert!(!SluiceError::usage("nope").is_policy_violation());
    }
}
