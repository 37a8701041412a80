//! # Ingot Core
//!
//! Core types for the Ingot plugin host.
//!
//! This crate provides the foundation the host and its plugins share:
//!
//! - **Inbound events**: the tagged [`InboundEvent`] variant over the wire
//!   `post_type`, with [`parse_event`] as the entry point.
//! - **Action interface**: the [`ActionInvoker`] trait through which a
//!   plugin calls named host capabilities, plus the typed payloads of the
//!   actions this repository uses ([`VersionInfo`], [`SendMsgParams`]).
//! - **Configuration values**: [`PluginConfig`] and [`ConfigValue`], the
//!   flat keyed blob a plugin persists and reads back.
//! - **Errors**: per-concern [`ActionError`] / [`EventError`] enums.
//!
//! Host-side machinery — the schema engine, the reactive resolver registry,
//! lifecycle management, and event dispatch — lives in `ingot-host`.

pub mod action;
pub mod config;
pub mod error;
pub mod event;

pub use action::{ActionInvoker, DisabledInvoker, GET_VERSION_INFO, SEND_MSG, SendMsgParams, VersionInfo};
pub use config::{ConfigValue, PluginConfig};
pub use error::{ActionError, ActionResult, EventError, EventResult};
pub use event::{InboundEvent, MessageEvent, MessageKind, parse_event};
