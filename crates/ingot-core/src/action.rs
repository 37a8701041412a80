//! Host action interface.
//!
//! Plugins call back into the host through named actions — fetch the
//! running app's version info, send a chat message. [`ActionInvoker`]
//! abstracts how those calls reach the protocol endpoint; the host supplies
//! the implementation, the plugin only sees the trait.
//!
//! The contract has no built-in timeout: callers wrap each invocation with
//! their own boundary (see the dispatcher in `ingot-host`) and treat expiry
//! the same as a failed call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionResult;
use crate::event::MessageKind;

/// Action name for fetching version information.
pub const GET_VERSION_INFO: &str = "get_version_info";

/// Action name for sending a chat message.
pub const SEND_MSG: &str = "send_msg";

// =============================================================================
// ActionInvoker trait
// =============================================================================

/// Host-provided interface for invoking named actions.
///
/// Implementations encapsulate the adapter and transport the call travels
/// through; the plugin addresses actions purely by name and JSON parameters.
///
/// # Errors
///
/// Returns an [`ActionError`](crate::error::ActionError) if the call fails
/// or the endpoint reports an error. Every call is at-most-once — the
/// plugin never retries.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    /// Invokes `action` with the given JSON parameters and returns the
    /// response data.
    async fn call(&self, action: &str, params: Value) -> ActionResult<Value>;
}

// =============================================================================
// DisabledInvoker — placeholder for hosts that cannot issue action calls
// =============================================================================

/// [`ActionInvoker`] for hosts without an action channel.
///
/// Any call returns [`ActionError::NotSupported`](crate::error::ActionError::NotSupported).
pub struct DisabledInvoker;

#[async_trait]
impl ActionInvoker for DisabledInvoker {
    async fn call(&self, _action: &str, _params: Value) -> ActionResult<Value> {
        Err(crate::error::ActionError::NotSupported)
    }
}

// =============================================================================
// Action payloads
// =============================================================================

/// Response data of the `get_version_info` action.
///
/// Transient — formatted into a reply and discarded, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Name of the running app.
    pub app_name: String,
    /// App version string.
    pub app_version: String,
    /// Protocol version the app speaks.
    pub protocol_version: String,
}

/// Parameters of the `send_msg` action.
///
/// Exactly one of `group_id` / `user_id` is set, matching
/// [`message_type`](Self::message_type): the group ID for group messages,
/// the user ID for private messages. IDs travel as strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMsgParams {
    /// The message text to send.
    pub message: String,
    /// Group or private delivery.
    pub message_type: MessageKind,
    /// Target group, for group messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Target user, for private messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
