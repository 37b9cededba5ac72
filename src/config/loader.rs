//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (PAGEGATE_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "pagegate.toml",
    ".pagegate.toml",
    "~/.config/pagegate/config.toml",
    "/etc/pagegate/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with PAGEGATE_ prefix
    // e.g., PAGEGATE_SERVER__PORT, PAGEGATE_PROTECTION__LOGIN_PATH
    // Double underscore (__) maps to nested keys (server.port)
    // prefix_separator is a single underscore so the documented
    // PAGEGATE_SERVER__PORT spelling works; without it the prefix would
    // reuse the nesting separator and require PAGEGATE__SERVER__PORT.
    builder = builder.add_source(
        Environment::with_prefix("PAGEGATE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. Short forms for the two secrets, so they do not need the nested
    // PAGEGATE_PROTECTION__* spelling in deployment environments
    if let Ok(token) = std::env::var("PAGEGATE_ADMIN_TOKEN") {
        builder = builder
            .set_override("protection.admin_token", token)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }
    if let Ok(token) = std::env::var("PAGEGATE_BYPASS_TOKEN") {
        builder = builder
            .set_override("protection.bypass_token", token)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }

    // Build and deserialize
    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    if !config.protection.login_path.starts_with('/') {
        return Err(ConfigError::Invalid {
            message: format!(
                "protection.login_path must start with '/', got: {}",
                config.protection.login_path
            ),
        });
    }

    let cookie = &config.protection.session_cookie;
    if cookie.is_empty()
        || cookie
            .chars()
            .any(|c| c == ';' || c == '=' || c.is_whitespace())
    {
        return Err(ConfigError::Invalid {
            message: "protection.session_cookie must be a non-empty cookie name".to_string(),
        });
    }

    if config.storage.backend == crate::config::StorageBackend::File
        && config.storage.path.is_empty()
    {
        return Err(ConfigError::Missing {
            field: "storage.path".to_string(),
        });
    }

    for (alias, canonical) in &config.aliases {
        if !alias.starts_with('/') || !canonical.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "aliases entries must be absolute paths, got: \"{}\" = \"{}\"",
                    alias, canonical
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[server]
port = 9001
content_dir = "site"

[protection]
login_path = "/unlock"
on_store_error = "allow"
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.content_dir, "site");
        assert_eq!(config.protection.login_path, "/unlock");
        assert_eq!(
            config.protection.on_store_error,
            crate::config::StoreErrorPolicy::Allow
        );
    }

    #[test]
    fn test_load_config_from_str_aliases() {
        let toml = r#"
[aliases]
"/new-events" = "/node/5"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.aliases.get("/new-events").unwrap(), "/node/5");
    }

    #[test]
    fn test_invalid_login_path_error() {
        let toml = r#"
[protection]
login_path = "unlock"
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn test_invalid_cookie_name_error() {
        let toml = r#"
[protection]
session_cookie = "has spaces"
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn test_zero_port_error() {
        let toml = r#"
[server]
port = 0
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn test_relative_alias_error() {
        let toml = r#"
[aliases]
"new-events" = "/node/5"
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn test_file_backend_requires_path() {
        let toml = r#"
[storage]
backend = "file"
path = ""
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn test_secrets_deserialized_redacted() {
        let toml = r#"
[protection]
admin_token = "top-secret"
"#;
        let config = load_config_from_str(toml).unwrap();
        let token = config.protection.admin_token.unwrap();
        assert_eq!(token.expose_secret(), "top-secret");
        assert_eq!(format!("{:?}", token), "[REDACTED]");
    }
}
