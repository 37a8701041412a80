//! Host-side error types.
//!
//! Two concerns live here: persisted-config storage and schema mutation.
//! Action and event errors are defined in `ingot-core`.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors that can occur while loading or saving the persisted config blob.
///
/// Load-path failures are recovered locally by the lifecycle manager (it
/// logs a warning and keeps built-in defaults); save-path failures are
/// surfaced to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to read the blob file.
    #[error("failed to read config from {path}: {source}")]
    Read {
        /// Path of the blob file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The blob exists but is not a valid config object.
    #[error("malformed config at {path}: {source}")]
    Malformed {
        /// Path of the blob file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Failed to create the directory the blob lives in.
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write the blob file.
    #[error("failed to write config to {path}: {source}")]
    Write {
        /// Path of the blob file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config could not be serialized.
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors raised by schema mutations.
///
/// Only `update_field` on an absent key fails; `remove_field` on an absent
/// key is a no-op by contract.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// No field with this key exists in the schema.
    #[error("no field with key '{key}' in schema")]
    NotFound {
        /// The missing field key.
        key: String,
    },
}

impl SchemaError {
    /// Creates a not-found error for `key`.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
