//! Inbound protocol events.
//!
//! The host delivers events as JSON objects discriminated by `post_type`.
//! [`InboundEvent`] models that shape as a tagged variant with one case per
//! post type; only the [`Message`](InboundEvent::Message) case exposes the
//! fields the event dispatcher needs, so downstream code never has to probe
//! for field presence.
//!
//! # Parsing
//!
//! [`parse_event`] inspects the `post_type` discriminator in the raw JSON
//! and deserializes the matching case:
//!
//! ```rust
//! use ingot_core::event::{InboundEvent, parse_event};
//!
//! let event = parse_event(
//!     r#"{"post_type":"message","message_type":"private","raw_message":"hi","user_id":42}"#,
//! ).unwrap();
//! assert!(matches!(event, InboundEvent::Message(_)));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EventError, EventResult};

/// Whether a message was received in a group or a private chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Group chat message.
    Group,
    /// Private (direct) message.
    Private,
}

impl MessageKind {
    /// Returns the wire string for this kind (`"group"` / `"private"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Private => "private",
        }
    }
}

/// A message event.
///
/// The only event case the dispatcher inspects beyond its tag. `user_id`
/// and `group_id` are optional on the wire; which one is meaningful depends
/// on [`kind`](Self::kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Raw message text (CQ codes or plain text).
    #[serde(default)]
    pub raw_message: String,
    /// Group or private chat.
    #[serde(rename = "message_type")]
    pub kind: MessageKind,
    /// Sender's user ID, when present.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Group ID, when present.
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// An inbound event, discriminated by the wire `post_type`.
///
/// Non-message cases carry no fields — the dispatcher classifies and skips
/// them, and nothing else in this crate consumes their payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "post_type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Lifecycle or heartbeat meta event.
    MetaEvent {},
    /// Friend or group request.
    Request {},
    /// Group change, recall, or similar notice.
    Notice {},
    /// An incoming chat message.
    Message(MessageEvent),
    /// Echo of a message this bot sent.
    MessageSent {},
}

impl InboundEvent {
    /// Returns the message payload if this is a message event.
    pub fn as_message(&self) -> Option<&MessageEvent> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Parses raw JSON into an [`InboundEvent`].
///
/// Pre-parses the `post_type` discriminator so an unmodeled post type is
/// reported as [`EventError::UnknownPostType`] rather than a generic serde
/// failure.
pub fn parse_event(raw: &str) -> EventResult<InboundEvent> {
    let v: Value = serde_json::from_str(raw)?;
    let post_type = v.get("post_type").and_then(Value::as_str).unwrap_or("");
    match post_type {
        "meta_event" | "request" | "notice" | "message" | "message_sent" => {
            Ok(serde_json::from_value(v)?)
        }
        other => Err(EventError::UnknownPostType(other.to_string())),
    }
}
