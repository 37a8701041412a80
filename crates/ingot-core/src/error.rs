//! Unified error types for the Ingot core crate.
//!
//! Host-side errors (schema and storage) are defined in `ingot-host`.

use thiserror::Error;

// =============================================================================
// Action Errors
// =============================================================================

/// Errors that can occur when invoking a host action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The invoker does not support API calls.
    #[error("action calls are not supported by this invoker")]
    NotSupported,

    /// The invoker lost its connection to the protocol endpoint.
    #[error("action invoker is not connected")]
    NotConnected,

    /// The call did not complete within the caller's timeout boundary.
    #[error("action timed out")]
    Timeout,

    /// The endpoint reported a failure for this action.
    #[error("action '{action}' failed: {reason}")]
    Failed {
        /// The action name that failed.
        action: String,
        /// Reason reported by the endpoint.
        reason: String,
    },

    /// The action payload or response could not be (de)serialized.
    #[error("failed to encode action payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ActionError {
    /// Creates a failure error for the given action.
    pub fn failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Event Errors
// =============================================================================

/// Errors that can occur while parsing an inbound protocol event.
#[derive(Debug, Error)]
pub enum EventError {
    /// The payload is not valid JSON or is missing required fields.
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload carries a `post_type` this crate does not model.
    #[error("unknown post_type '{0}'")]
    UnknownPostType(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for action invocations.
pub type ActionResult<T> = Result<T, ActionError>;

/// Result type for event parsing.
pub type EventResult<T> = Result<T, EventError>;
