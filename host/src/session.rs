//! Login state on top of `ApiClient`.
//!
//! `Session` owns the token store: it writes the token after a successful
//! login, removes it at logout or when the server rejects it, and hands out
//! the `AuthContext` each request is built with.

use std::sync::Arc;

use tracing::{info, warn};

use blog_api_core::guard::{self, Navigation};
use blog_api_core::{
    ApiError, AuthContext, ClientConfig, LoginData, LoginRequest, MemoryTokenStore, TokenScope, TokenStore, TOKEN_KEY,
};

use crate::client::ApiClient;
use crate::store::FileTokenStore;

#[derive(Clone)]
pub struct Session {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(client: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self { client, store }
    }

    /// A ureq-backed client with the store `config.token_scope` selects.
    pub fn from_config(config: &ClientConfig) -> Self {
        let store: Arc<dyn TokenStore> = match config.token_scope {
            TokenScope::Persistent => Arc::new(FileTokenStore::new(&config.token_file)),
            TokenScope::Session => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(ApiClient::new(config), store)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Read the stored token once, for the next request.
    pub fn auth(&self) -> Result<AuthContext, ApiError> {
        AuthContext::from_store(self.store.as_ref())
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginData, ApiError> {
        let data = self.client.login(credentials).await?;
        self.store.set(TOKEN_KEY, &data.token)?;
        info!(username = %credentials.username, "logged in");
        Ok(data)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.remove(TOKEN_KEY)?;
        info!("logged out");
        Ok(())
    }

    /// Forget the token when `result` says the server no longer accepts it.
    /// `result` comes back unchanged even if the token cannot be removed.
    pub fn clear_on_unauthorized<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                match self.store.remove(TOKEN_KEY) {
                    Ok(()) => info!("token rejected, cleared"),
                    Err(store_err) => warn!(error = %store_err, "token rejected, but clearing it failed"),
                }
            }
        }
        result
    }

    /// Route guard against the stored token.
    pub fn check_route(&self, route: &str) -> Result<Navigation, ApiError> {
        Ok(guard::check(route, &self.auth()?))
    }
}
