//! Configuration management for signin-guard.

pub mod paths;
pub mod settings;

pub use paths::config_file;
pub use settings::{GuardConfig, ProviderConfig, SecurityConfig, SessionConfig};

use std::path::Path;

use crate::error::{GuardError, Result};

/// Load configuration from the default config file.
///
/// If the config file doesn't exist, returns default configuration.
pub fn load_config() -> Result<GuardConfig> {
    let path = config_file()?;
    load_config_from(&path)
}

/// Load configuration from a specific path.
///
/// If the file doesn't exist, returns default configuration.
pub fn load_config_from(path: &Path) -> Result<GuardConfig> {
    if !path.exists() {
        return Ok(GuardConfig::default().with_env_overrides());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: GuardConfig =
        toml::from_str(&contents).map_err(|e| GuardError::ConfigRead(e.to_string()))?;

    Ok(config.with_env_overrides())
}

/// Save configuration to a specific path.
pub fn save_config_to(config: &GuardConfig, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| GuardError::ConfigWrite(e.to_string()))?;
    std::fs::write(path, contents)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_from(&temp_dir.path().join("absent.toml")).unwrap();

        assert!(config.security.state_guard);
        assert_eq!(config.security.intent_max_age_secs, 600);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[provider]
client_id = "my-app"
auth_url = "https://id.example.com/authorize"
token_url = "https://id.example.com/token"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.provider.client_id.as_deref(), Some("my-app"));
        assert_eq!(
            config.provider.auth_url.as_ref().map(url::Url::as_str),
            Some("https://id.example.com/authorize")
        );
        assert!(config.security.state_guard);
        assert_eq!(config.provider.scopes, vec!["openid", "profile", "email"]);
    }

    #[test]
    fn invalid_url_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[provider]\nauth_url = \"not a url\"\n").unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(GuardError::ConfigRead(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = GuardConfig::default();
        config.security.state_guard = false;
        config.security.intent_max_age_secs = 0;
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert!(!loaded.security.state_guard);
        assert_eq!(loaded.security.intent_max_age(), None);
    }
}
