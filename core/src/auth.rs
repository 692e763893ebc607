//! Session token handling.
//!
//! # Design
//! Request builders never read storage themselves. The caller reads the token
//! once (`AuthContext::from_store`) and passes the resulting context into each
//! `build_*` call, so what a request carries is visible at the call site.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ApiError;

/// Fixed key the session token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Key-value storage for the session token.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// Process-lifetime token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Credentials attached to outbound requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    /// No token; requests go out unauthenticated.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    /// Read the token under `TOKEN_KEY`. An empty stored value counts as absent.
    pub fn from_store(store: &dyn TokenStore) -> Result<Self, ApiError> {
        Ok(match store.get(TOKEN_KEY)? {
            Some(token) => Self::with_token(token),
            None => Self::anonymous(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
