//! # Ingot Host
//!
//! Plugin-host contract for a chat-bot runtime: lifecycle management,
//! a reactive configuration schema, and inbound event dispatch.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐ initialize / sessions ┌─────────────┐
//! │   Host    │──────────────────────▶│ PluginHost  │
//! │           │                       │  (lifecycle)│
//! │           │ renders               └──────┬──────┘
//! │           │◀── SchemaHandle ◀── ResolverRegistry
//! │           │ events                ┌──────▼──────────┐
//! │           │──────────────────────▶│ EventDispatcher │──▶ ActionInvoker
//! └───────────┘                       └─────────────────┘
//! ```
//!
//! - [`schema`]: ordered, key-unique [`FieldDefinition`] container with
//!   add/update/remove/snapshot operations — the configuration-UI contract.
//! - [`reactive`]: trigger→resolver bindings that add, update, or remove
//!   dependent fields when a trigger field's value changes.
//! - [`lifecycle`]: [`PluginHost`] owning the instance state, persisted
//!   config, and configuration sessions.
//! - [`dispatch`]: [`EventDispatcher`] matching prefixed messages and
//!   replying with version info through the host's action interface.
//! - [`storage`]: the JSON config blob store.
//! - [`builtin`]: the demonstration plugin's fields, defaults, and
//!   endpoint resolver.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ingot_core::parse_event;
//! use ingot_host::{EventDispatcher, HostContext, PluginHost};
//!
//! let host = PluginHost::initialize(HostContext::new("data/builtin/config.json")).await;
//! let dispatcher = EventDispatcher::new(Arc::new(MyInvoker));
//!
//! let event = parse_event(raw)?;
//! dispatcher.dispatch(&event, host.state()).await;
//! ```

pub mod builtin;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod reactive;
pub mod schema;
pub mod storage;

pub use dispatch::{EventDispatcher, format_uptime};
pub use error::{SchemaError, SchemaResult, StorageError, StorageResult};
pub use lifecycle::{HostContext, LifecyclePhase, PluginHost, PluginState, SessionGuard};
pub use reactive::{ResolveFn, ResolverRegistry, sync_resolver};
pub use schema::{ConfigSchema, FieldDefinition, FieldKind, FieldPatch, SchemaHandle, SelectOption};
pub use storage::ConfigStore;
