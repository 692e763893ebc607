//! Static client configuration.
//!
//! Values come from a TOML document and may be overridden by `BLOG_API_*`
//! environment variables. Nothing here is negotiated at runtime.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOGIN_PATH: &str = "/user/login";
pub const DEFAULT_TOKEN_FILE: &str = "blog-api-token.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// How the token is written into the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// The token verbatim.
    #[default]
    Raw,
    /// `Bearer <token>`.
    Bearer,
}

impl AuthScheme {
    pub fn header_value(self, token: &str) -> String {
        match self {
            AuthScheme::Raw => token.to_string(),
            AuthScheme::Bearer => format!("Bearer {token}"),
        }
    }
}

impl FromStr for AuthScheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(AuthScheme::Raw),
            "bearer" => Ok(AuthScheme::Bearer),
            _ => Err(()),
        }
    }
}

/// Where the session token lives.
///
/// `Persistent` survives restarts (a file on disk), `Session` lasts for the
/// lifetime of the process. Which one a deployment wants ("remember me" or
/// per-session login) is a deployment decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    #[default]
    Persistent,
    Session,
}

impl FromStr for TokenScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persistent" => Ok(TokenScope::Persistent),
            "session" => Ok(TokenScope::Session),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Requests to this path never carry the session token.
    pub login_path: String,
    pub auth_scheme: AuthScheme,
    pub token_scope: TokenScope,
    /// Backing file for the persistent token store.
    pub token_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            auth_scheme: AuthScheme::default(),
            token_scope: TokenScope::default(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `BLOG_API_*` overrides, looking each variable up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BLOG_API_BASE_URL") {
            self.base_url = val;
        }
        if let Some(val) = lookup("BLOG_API_TIMEOUT_MS") {
            self.timeout_ms = parse_value("BLOG_API_TIMEOUT_MS", &val, |v| v.parse().ok())?;
        }
        if let Some(val) = lookup("BLOG_API_LOGIN_PATH") {
            self.login_path = val;
        }
        if let Some(val) = lookup("BLOG_API_AUTH_SCHEME") {
            self.auth_scheme = parse_value("BLOG_API_AUTH_SCHEME", &val, |v| v.parse().ok())?;
        }
        if let Some(val) = lookup("BLOG_API_TOKEN_SCOPE") {
            self.token_scope = parse_value("BLOG_API_TOKEN_SCOPE", &val, |v| v.parse().ok())?;
        }
        if let Some(val) = lookup("BLOG_API_TOKEN_FILE") {
            self.token_file = PathBuf::from(val);
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, ConfigError> {
    parse(value.trim()).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
