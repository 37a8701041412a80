//! Inbound event dispatch.
//!
//! [`EventDispatcher`] turns a matching inbound message into a version-info
//! reply: it gates on the live `enableReply` flag, matches the configured
//! command prefix, fetches version info through the host's action
//! interface, and sends the formatted reply back.
//!
//! Every action call is bounded by a timeout; expiry is treated exactly
//! like a failed call — logged, converted to "no data", never propagated.
//! Sends are fire-and-forget: a failure is logged and the dispatcher moves
//! on, with no retry.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;
use tracing::{error, info, warn};

use ingot_core::{
    ActionInvoker, GET_VERSION_INFO, InboundEvent, MessageEvent, MessageKind, SEND_MSG,
    SendMsgParams, VersionInfo,
};

use crate::builtin::{DEFAULT_PREFIX, ENABLE_REPLY_KEY, PREFIX_KEY};
use crate::lifecycle::PluginState;

/// Default boundary for a single action call.
const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// EventDispatcher
// =============================================================================

/// Dispatches inbound events against the live plugin state.
pub struct EventDispatcher {
    invoker: Arc<dyn ActionInvoker>,
    action_timeout: Duration,
}

impl EventDispatcher {
    /// Creates a dispatcher calling through `invoker`, with the default
    /// 30 s action timeout.
    pub fn new(invoker: Arc<dyn ActionInvoker>) -> Self {
        Self {
            invoker,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout boundary.
    pub fn with_timeout(mut self, action_timeout: Duration) -> Self {
        self.action_timeout = action_timeout;
        self
    }

    /// Handles one inbound event.
    ///
    /// Reads the *current* committed config at entry — never a value
    /// captured before a suspension point — then:
    ///
    /// 1. Returns immediately when replies are disabled.
    /// 2. Accepts only message events whose raw text starts with the
    ///    configured prefix (exact, case-sensitive, no trimming).
    /// 3. Fetches version info; any failure aborts the dispatch silently.
    /// 4. Formats and sends the reply.
    ///
    /// Returns `true` when a reply was sent.
    pub async fn dispatch(&self, event: &InboundEvent, state: &PluginState) -> bool {
        let config = state.config();
        if config.flag(ENABLE_REPLY_KEY) == Some(false) {
            return false;
        }

        let Some(msg) = event.as_message() else {
            return false;
        };
        let prefix = match config.text(PREFIX_KEY) {
            Some(p) if !p.is_empty() => p,
            _ => DEFAULT_PREFIX,
        };
        if !msg.raw_message.starts_with(prefix) {
            return false;
        }

        let Some(info) = self.fetch_version_info().await else {
            return false;
        };

        let reply = format_reply(&info, state.uptime());
        self.deliver(msg, reply).await
    }

    /// Fetches version info, mapping every failure mode — error, timeout,
    /// empty or malformed response — to `None`.
    async fn fetch_version_info(&self) -> Option<VersionInfo> {
        let call = self.invoker.call(GET_VERSION_INFO, Value::Null);
        let data = match timeout(self.action_timeout, call).await {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                error!(action = GET_VERSION_INFO, error = %e, "action call failed");
                return None;
            }
            Err(_) => {
                error!(action = GET_VERSION_INFO, "action call timed out");
                return None;
            }
        };
        if data.is_null() {
            warn!(action = GET_VERSION_INFO, "action returned no data");
            return None;
        }
        match serde_json::from_value(data) {
            Ok(info) => Some(info),
            Err(e) => {
                error!(action = GET_VERSION_INFO, error = %e, "malformed action response");
                None
            }
        }
    }

    /// Sends the reply. Failures are logged and otherwise ignored.
    async fn deliver(&self, msg: &MessageEvent, reply: String) -> bool {
        let params = send_params(msg, reply);
        let payload = match serde_json::to_value(&params) {
            Ok(payload) => payload,
            Err(e) => {
                error!(action = SEND_MSG, error = %e, "failed to encode send payload");
                return false;
            }
        };
        match timeout(self.action_timeout, self.invoker.call(SEND_MSG, payload)).await {
            Ok(Ok(_)) => {
                info!("replied with version info");
                true
            }
            Ok(Err(e)) => {
                error!(action = SEND_MSG, error = %e, "failed to send reply");
                false
            }
            Err(_) => {
                error!(action = SEND_MSG, "send timed out");
                false
            }
        }
    }
}

// =============================================================================
// Reply formatting
// =============================================================================

/// Renders an elapsed duration as its two highest units, largest first:
/// days+hours, hours+minutes, or minutes+seconds, falling back to seconds
/// alone under one minute.
pub fn format_uptime(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{days}天 {}小时", hours % 24)
    } else if hours > 0 {
        format!("{hours}小时 {}分钟", minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}分钟 {}秒", seconds % 60)
    } else {
        format!("{seconds}秒")
    }
}

fn platform_label() -> String {
    if std::env::consts::ARCH == "x86_64" {
        format!("{} (64-bit)", std::env::consts::OS)
    } else {
        std::env::consts::OS.to_string()
    }
}

fn format_reply(info: &VersionInfo, uptime: Duration) -> String {
    format!(
        "{} 信息\n版本: {}\n平台: {}\n运行时间: {}",
        info.app_name,
        info.app_version,
        platform_label(),
        format_uptime(uptime),
    )
}

/// Builds the outgoing payload with exactly one of `group_id` / `user_id`,
/// matching the message kind.
fn send_params(msg: &MessageEvent, message: String) -> SendMsgParams {
    let group_id = match (msg.kind, msg.group_id) {
        (MessageKind::Group, Some(id)) => Some(id.to_string()),
        _ => None,
    };
    let user_id = match (msg.kind, msg.user_id) {
        (MessageKind::Private, Some(id)) => Some(id.to_string()),
        _ => None,
    };
    SendMsgParams {
        message,
        message_type: msg.kind,
        group_id,
        user_id,
    }
}
