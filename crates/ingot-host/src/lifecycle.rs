//! Plugin lifecycle management.
//!
//! [`PluginHost`] owns one plugin instance's state across its whole life:
//! it builds the schema and reactive bindings at initialization, loads and
//! overlays the persisted config, serves config reads and writes, and
//! brackets configuration sessions.
//!
//! # Lifecycle
//!
//! ```text
//! initialize ─▶ Initialized ─▶ SessionOpen ─▶ SessionClosed ─▶ Initialized ─▶ …
//! ```
//!
//! The uninitialized state is the absence of the host value —
//! [`PluginHost::initialize`] is the only constructor. The instance
//! survives any number of configuration sessions; a session's cleanup is
//! the [`SessionGuard`] it hands back.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use ingot_core::{ConfigValue, PluginConfig};

use crate::builtin;
use crate::error::StorageResult;
use crate::reactive::ResolverRegistry;
use crate::schema::SchemaHandle;
use crate::storage::ConfigStore;

// =============================================================================
// HostContext
// =============================================================================

/// Context the host passes to [`PluginHost::initialize`].
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Path of the persisted config blob for this plugin instance.
    pub config_path: PathBuf,
}

impl HostContext {
    /// Creates a context with the given config path.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

// =============================================================================
// Lifecycle phase
// =============================================================================

/// Where the instance currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Initialized, no configuration session open.
    Initialized,
    /// A configuration session is open.
    SessionOpen,
    /// A session just closed; transits straight back to `Initialized`.
    SessionClosed,
}

// =============================================================================
// PluginState
// =============================================================================

/// Process-wide state of one plugin instance.
///
/// Created at initialization and shared by reference into every hook and
/// dispatcher call. Config reads always observe the current committed
/// value — a writer replaces the whole config under the lock, so a
/// concurrent reader sees either the old or the new config, never a
/// partial mix.
pub struct PluginState {
    config: RwLock<PluginConfig>,
    start_time: Instant,
}

impl PluginState {
    pub(crate) fn new(config: PluginConfig) -> Self {
        Self {
            config: RwLock::new(config),
            start_time: Instant::now(),
        }
    }

    /// Snapshot of the current committed config.
    pub fn config(&self) -> PluginConfig {
        self.config.read().clone()
    }

    /// Atomically replaces the whole config.
    pub(crate) fn replace_config(&self, new: PluginConfig) {
        *self.config.write() = new;
    }

    /// Time elapsed since initialization.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// =============================================================================
// SessionGuard
// =============================================================================

/// Cleanup handle of an open configuration session.
///
/// [`close`](Self::close) is idempotent and also runs on drop, so a guard
/// that goes out of scope cannot leave the instance stuck in
/// [`LifecyclePhase::SessionOpen`].
pub struct SessionGuard {
    phase: Arc<Mutex<LifecyclePhase>>,
    closed: AtomicBool,
}

impl SessionGuard {
    fn new(phase: Arc<Mutex<LifecyclePhase>>) -> Self {
        Self {
            phase,
            closed: AtomicBool::new(false),
        }
    }

    /// Closes the session. A second call is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        {
            let mut phase = self.phase.lock();
            *phase = LifecyclePhase::SessionClosed;
            debug!("configuration session closed");
            *phase = LifecyclePhase::Initialized;
        }
        info!("configuration session cleaned up");
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// PluginHost
// =============================================================================

/// Lifecycle manager for one plugin instance.
pub struct PluginHost {
    state: Arc<PluginState>,
    schema: SchemaHandle,
    resolvers: ResolverRegistry,
    store: ConfigStore,
    phase: Arc<Mutex<LifecyclePhase>>,
}

impl PluginHost {
    /// Initializes a plugin instance.
    ///
    /// Builds the static schema, registers the reactive bindings, then
    /// overlays the persisted config onto built-in defaults. A missing
    /// blob means defaults; an unreadable or malformed blob is logged and
    /// recovered with defaults — initialization never fails on the load
    /// path.
    pub async fn initialize(ctx: HostContext) -> Self {
        let schema = SchemaHandle::new();
        let resolvers = ResolverRegistry::new();
        builtin::install(&schema, &resolvers);

        let store = ConfigStore::new(ctx.config_path);
        let mut config = builtin::default_config();
        match store.load().await {
            Ok(Some(saved)) => {
                debug!(path = %store.path().display(), "loaded persisted config");
                config.overlay(saved);
            }
            Ok(None) => {
                debug!(path = %store.path().display(), "no persisted config, using defaults");
            }
            Err(e) => {
                warn!(error = %e, "failed to load persisted config, keeping defaults");
            }
        }

        info!("plugin initialized");
        Self {
            state: Arc::new(PluginState::new(config)),
            schema,
            resolvers,
            store,
            phase: Arc::new(Mutex::new(LifecyclePhase::Initialized)),
        }
    }

    /// The shared instance state.
    pub fn state(&self) -> &Arc<PluginState> {
        &self.state
    }

    /// The live schema handle (the configuration-UI contract object).
    pub fn schema(&self) -> &SchemaHandle {
        &self.schema
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.lock()
    }

    /// Snapshot of the current config. Pure read, no side effects.
    pub fn config(&self) -> PluginConfig {
        self.state.config()
    }

    /// Replaces the whole config and persists it.
    ///
    /// The in-memory config is committed first; the blob write follows.
    ///
    /// # Errors
    ///
    /// Persistence failures are surfaced to the caller — unlike load
    /// failures, they are not recovered locally.
    pub async fn set_config(&self, new: PluginConfig) -> StorageResult<()> {
        self.state.replace_config(new.clone());
        self.store.save(&new).await.inspect_err(|e| {
            warn!(error = %e, "failed to persist config");
        })
    }

    /// Opens a configuration session.
    ///
    /// When the session's initial config carries a non-empty trigger value
    /// for `apiUrl`, the dependent field is resolved before this returns,
    /// so it is present for the session's first render.
    pub async fn open_session(&self, initial: &PluginConfig) -> SessionGuard {
        *self.phase.lock() = LifecyclePhase::SessionOpen;
        info!("configuration session opened");

        if let Some(url) = initial.text(builtin::API_URL_KEY)
            && !url.is_empty()
        {
            self.resolvers
                .on_trigger_changed(
                    builtin::API_URL_KEY,
                    &ConfigValue::from(url.to_string()),
                    &self.schema,
                )
                .await;
        }

        SessionGuard::new(Arc::clone(&self.phase))
    }

    /// Notifies the instance that one field was edited in an open session.
    ///
    /// `_current` is the session's in-progress edit snapshot as relayed by
    /// the host; the committed config is untouched until `set_config`.
    /// Routes to the resolver registry when `key` is a registered trigger;
    /// other keys only get logged.
    pub async fn on_field_changed(&self, key: &str, value: &ConfigValue, _current: &PluginConfig) {
        info!(key = %key, value = %value, "config field changed");
        if self.resolvers.has_trigger(key) {
            self.resolvers
                .on_trigger_changed(key, value, &self.schema)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx(dir: &TempDir) -> HostContext {
        HostContext::new(dir.path().join("config.json"))
    }

    #[tokio::test]
    async fn initialize_overlays_persisted_keys_onto_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, br#"{"prefix":"!go","apiUrl":"https://x"}"#)
            .await
            .unwrap();

        let host = PluginHost::initialize(HostContext::new(&path)).await;
        let config = host.config();

        // Persisted keys win.
        assert_eq!(config.text("prefix"), Some("!go"));
        assert_eq!(config.text("apiUrl"), Some("https://x"));
        // Absent keys keep their defaults.
        assert_eq!(config.flag("enableReply"), Some(true));
        assert_eq!(config.text("theme"), Some("light"));
        assert_eq!(config.text("description"), Some("这是一个内置插件的配置示例"));
    }

    #[tokio::test]
    async fn malformed_blob_is_recovered_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, b"{{{{").await.unwrap();

        let host = PluginHost::initialize(HostContext::new(&path)).await;
        assert_eq!(host.config(), builtin::default_config());
    }

    #[tokio::test]
    async fn set_config_round_trips_across_restart() {
        let dir = TempDir::new().unwrap();

        let host = PluginHost::initialize(ctx(&dir)).await;
        let mut config = host.config();
        config.insert("prefix", "!re");
        config.insert("enableReply", false);
        host.set_config(config.clone()).await.unwrap();

        // Simulated restart.
        let host = PluginHost::initialize(ctx(&dir)).await;
        assert_eq!(host.config(), config);
    }

    #[tokio::test]
    async fn set_config_surfaces_persistence_failures() {
        let dir = TempDir::new().unwrap();
        // The blob path is an existing directory, so the write must fail.
        let host = PluginHost::initialize(HostContext::new(dir.path())).await;

        let result = host.set_config(builtin::default_config()).await;
        assert!(result.is_err());
        // The in-memory config was still committed.
        assert_eq!(host.config(), builtin::default_config());
    }

    #[tokio::test]
    async fn open_session_resolves_dynamic_field_up_front() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::initialize(ctx(&dir)).await;

        let mut initial = host.config();
        initial.insert("apiUrl", "https://api.example");
        let session = host.open_session(&initial).await;

        assert_eq!(host.phase(), LifecyclePhase::SessionOpen);
        let snap = host.schema().snapshot();
        let endpoints = snap.get(builtin::API_ENDPOINTS_KEY).unwrap();
        assert_eq!(endpoints.options[0].label, "https://api.example/users");

        session.close();
        assert_eq!(host.phase(), LifecyclePhase::Initialized);
    }

    #[tokio::test]
    async fn open_session_skips_resolution_for_empty_trigger() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::initialize(ctx(&dir)).await;

        let _session = host.open_session(&host.config()).await;
        assert!(!host.schema().contains(builtin::API_ENDPOINTS_KEY));
    }

    #[tokio::test]
    async fn session_close_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::initialize(ctx(&dir)).await;

        let session = host.open_session(&host.config()).await;
        session.close();
        session.close();
        assert_eq!(host.phase(), LifecyclePhase::Initialized);
    }

    #[tokio::test]
    async fn dropped_guard_closes_the_session() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::initialize(ctx(&dir)).await;

        {
            let _session = host.open_session(&host.config()).await;
            assert_eq!(host.phase(), LifecyclePhase::SessionOpen);
        }
        assert_eq!(host.phase(), LifecyclePhase::Initialized);
    }

    #[tokio::test]
    async fn reopened_sessions_do_not_duplicate_the_dynamic_field() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::initialize(ctx(&dir)).await;

        let mut initial = host.config();
        initial.insert("apiUrl", "https://x");

        for _ in 0..3 {
            let session = host.open_session(&initial).await;
            session.close();
        }

        let snap = host.schema().snapshot();
        let count = snap
            .fields()
            .iter()
            .filter(|f| f.key == builtin::API_ENDPOINTS_KEY)
            .count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn field_change_routes_to_the_reactive_binding() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::initialize(ctx(&dir)).await;
        let _session = host.open_session(&host.config()).await;

        let editing = host.config();
        host.on_field_changed("apiUrl", &ConfigValue::from("https://y"), &editing)
            .await;
        let snap = host.schema().snapshot();
        assert_eq!(
            snap.get(builtin::API_ENDPOINTS_KEY).unwrap().options[1].label,
            "https://y/posts"
        );

        // Clearing the trigger removes the dependent field.
        host.on_field_changed("apiUrl", &ConfigValue::from(""), &editing)
            .await;
        assert!(!host.schema().contains(builtin::API_ENDPOINTS_KEY));

        // Non-trigger edits leave the schema alone.
        let before = host.schema().snapshot().len();
        host.on_field_changed("theme", &ConfigValue::from("dark"), &editing)
            .await;
        assert_eq!(host.schema().snapshot().len(), before);
    }
}
