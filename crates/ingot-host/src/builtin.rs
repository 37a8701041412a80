//! The built-in demonstration plugin.
//!
//! Declares the static configuration schema (seven fields, including one
//! reactive trigger), the endpoint resolver that derives the dynamic
//! `apiEndpoints` field from `apiUrl`, and the built-in default config.
//!
//! The resolver here is deterministic — it appends four fixed suffixes to
//! the trigger value. A production plugin would replace it with a network
//! lookup; the add/update/remove contract it plays against stays the same.

use ingot_core::{ConfigValue, PluginConfig};

use crate::reactive::{ResolveFn, ResolverRegistry, sync_resolver};
use crate::schema::{FieldDefinition, SchemaHandle, SelectOption};

/// Key of the command-prefix field.
pub const PREFIX_KEY: &str = "prefix";

/// Key of the reply-gate toggle.
pub const ENABLE_REPLY_KEY: &str = "enableReply";

/// Key of the reactive trigger field.
pub const API_URL_KEY: &str = "apiUrl";

/// Key of the dynamic dependent field.
pub const API_ENDPOINTS_KEY: &str = "apiEndpoints";

/// Prefix used when the config carries none.
pub const DEFAULT_PREFIX: &str = "#napcat";

/// Suffixes appended to the trigger value to derive endpoint options.
const ENDPOINT_SUFFIXES: [&str; 4] = ["/users", "/posts", "/comments", "/albums"];

/// The static field set, in render order.
pub fn config_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::html(
            "welcome",
            "<div style=\"padding: 10px; background: rgba(0,0,0,0.05); border-radius: 8px;\">\
             <h3>👋 Welcome to the Builtin Plugin</h3>\
             <p>This is a demonstration of the plugin configuration interface with reactive fields.</p></div>",
        ),
        FieldDefinition::text(
            PREFIX_KEY,
            "Command Prefix",
            DEFAULT_PREFIX,
            "The prefix to trigger the version info command",
        ),
        FieldDefinition::boolean(
            ENABLE_REPLY_KEY,
            "Enable Reply",
            true,
            "Switch to enable or disable the reply functionality",
        ),
        FieldDefinition::text(
            API_URL_KEY,
            "API URL",
            "",
            "Enter an API URL to load available endpoints",
        )
        .reactive(),
        FieldDefinition::select(
            "theme",
            "Theme Selection",
            vec![
                SelectOption::new("Light Mode", "light"),
                SelectOption::new("Dark Mode", "dark"),
                SelectOption::new("Auto", "auto"),
            ],
            "light",
            "Select a theme for the response (Demo purpose only)",
        ),
        FieldDefinition::multi_select(
            "features",
            "Enabled Features",
            vec![
                SelectOption::new("Version Info", "version"),
                SelectOption::new("Status Report", "status"),
                SelectOption::new("Debug Log", "debug"),
            ],
            vec!["version".to_string()],
            "Select features to enable",
        ),
        FieldDefinition::text(
            "description",
            "Description",
            "这是一个内置插件的配置示例",
            "A multi-line text area for notes",
        ),
    ]
}

/// Built-in defaults, derived from the schema's field defaults.
///
/// Every value-bearing field contributes its default, so the config always
/// holds `prefix`, `enableReply`, `apiUrl`, `theme`, `features`, and
/// `description` after initialization.
pub fn default_config() -> PluginConfig {
    config_fields()
        .into_iter()
        .filter_map(|f| f.default.map(|d| (f.key, d)))
        .collect()
}

/// Resolver for the `apiUrl → apiEndpoints` binding.
///
/// An empty trigger value removes the dependent field; any other value
/// yields a multi-select whose options are the trigger value with each of
/// the four fixed suffixes appended (label: full URL, value: suffix).
pub fn endpoint_resolver() -> ResolveFn {
    sync_resolver(|value: &ConfigValue| {
        let api_url = value.as_text().unwrap_or("");
        if api_url.is_empty() {
            return None;
        }
        let options = ENDPOINT_SUFFIXES
            .iter()
            .map(|suffix| SelectOption::new(format!("{api_url}{suffix}"), *suffix))
            .collect();
        Some(FieldDefinition::multi_select(
            API_ENDPOINTS_KEY,
            "API Endpoints",
            options,
            Vec::new(),
            format!("从 {api_url} 加载的端点"),
        ))
    })
}

/// Installs the static fields and the reactive binding.
pub fn install(schema: &SchemaHandle, resolvers: &ResolverRegistry) {
    for field in config_fields() {
        schema.add_field(field, None);
    }
    resolvers.register(API_URL_KEY, API_ENDPOINTS_KEY, endpoint_resolver());
}
