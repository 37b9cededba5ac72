//! Configuration types for pagegate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::util::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Protection gate settings
    pub protection: ProtectionConfig,

    /// Record storage settings
    pub storage: StorageConfig,

    /// Path aliases (alias -> canonical path)
    pub aliases: HashMap<String, String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Directory of site content served behind the gate
    pub content_dir: String,
}

/// Default port for the site server
pub const DEFAULT_PORT: u16 = 8273;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            content_dir: "public".to_string(),
        }
    }
}

/// Protection gate configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    /// Login endpoint path visitors are redirected to
    pub login_path: String,

    /// What to do when the record store fails during an evaluation
    pub on_store_error: StoreErrorPolicy,

    /// Name of the session id cookie
    pub session_cookie: String,

    /// Seconds an unlock stays valid; 0 keeps unlocks for the process lifetime
    pub session_ttl_secs: u64,

    /// Bearer token granting the bypass capability
    /// (prefer env var PAGEGATE_BYPASS_TOKEN)
    pub bypass_token: Option<SecretString>,

    /// Bearer token for the admin API, also grants bypass
    /// (prefer env var PAGEGATE_ADMIN_TOKEN)
    pub admin_token: Option<SecretString>,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            login_path: "/protected-page".to_string(),
            on_store_error: StoreErrorPolicy::Deny,
            session_cookie: "pagegate_session".to_string(),
            session_ttl_secs: 0,
            bypass_token: None,
            admin_token: None,
        }
    }
}

/// Behavior when the record store is unavailable during an evaluation.
///
/// This choice is security relevant: `allow` serves protected pages
/// unprotected while the store is down. The default fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreErrorPolicy {
    /// Fail closed: respond 503 until the store recovers (default)
    #[default]
    Deny,
    /// Fail open: let the response through, with a warning
    Allow,
}

/// Record storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend
    pub backend: StorageBackend,

    /// File path for the `file` backend
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "pagegate-pages.json".to_string(),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file, persisted across restarts (default)
    #[default]
    File,
    /// In-memory only, records lost on shutdown
    Memory,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.protection.login_path, "/protected-page");
        assert_eq!(config.protection.on_store_error, StoreErrorPolicy::Deny);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_deserialize_store_error_policy() {
        let policy: StoreErrorPolicy = serde_json::from_str(r#""allow""#).unwrap();
        assert_eq!(policy, StoreErrorPolicy::Allow);

        let policy: StoreErrorPolicy = serde_json::from_str(r#""deny""#).unwrap();
        assert_eq!(policy, StoreErrorPolicy::Deny);

        assert!(serde_json::from_str::<StoreErrorPolicy>(r#""maybe""#).is_err());
    }

    #[test]
    fn test_deserialize_storage_backend() {
        let backend: StorageBackend = serde_json::from_str(r#""memory""#).unwrap();
        assert_eq!(backend, StorageBackend::Memory);
    }
}
