//! Loading `ClientConfig` from disk.

use std::fs;
use std::path::Path;

use blog_api_core::{ClientConfig, ConfigError};

/// Read the TOML file at `path` (defaults when it does not exist), then apply
/// `BLOG_API_*` environment overrides.
pub fn load(path: &Path) -> Result<ClientConfig, ConfigError> {
    let mut config = if path.exists() {
        ClientConfig::from_toml_str(&fs::read_to_string(path)?)?
    } else {
        tracing::warn!("config file not found at {}, using defaults", path.display());
        ClientConfig::default()
    };
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, "login_path = \"/auth/login\"\ntoken_scope = \"session\"\n").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.login_path, "/auth/login");
        assert_eq!(config.token_scope, blog_api_core::TokenScope::Session);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.login_path, blog_api_core::config::DEFAULT_LOGIN_PATH);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, "timeout_ms = \"soon\"").unwrap();
        assert!(matches!(load(&path), Err(ConfigError::Parse(_))));
    }
}
