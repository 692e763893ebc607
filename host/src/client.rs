//! Async entry point for the blog API.
//!
//! # Design
//! `ApiClient` pairs a `BlogClient` (request building, both interceptor
//! stages) with a `Transport`. `request` is the one call surface feature code
//! uses: it takes a request that already went through the outbound stage,
//! performs the round-trip off the async executor and runs the inbound stage.
//! Failures are returned, never shown; see `blog_api_core::notify::surface`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use blog_api_core::interceptor;
use blog_api_core::{
    ApiError, Article, ArticleQuery, ArticleSummary, AuthContext, BlogClient, ClientConfig, HttpMethod, HttpRequest,
    HttpResponse, LoginData, LoginRequest, Page, PasswordChange, PasswordReset, Project, ProjectQuery,
    ResponseEnvelope, TransportErrorKind, User, UserQuery,
};

use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct ApiClient {
    core: BlogClient,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new(config.timeout_ms)))
    }

    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            core: BlogClient::from_config(config),
            transport,
        }
    }

    pub fn core(&self) -> &BlogClient {
        &self.core
    }

    /// Perform the round-trip for `request` without interpreting the response.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let transport = Arc::clone(&self.transport);
        let result = tokio::task::spawn_blocking(move || transport.execute(&request))
            .await
            .map_err(|e| ApiError::transport(TransportErrorKind::Other, e.to_string()))?;
        if let Err(err) = &result {
            warn!(error = %err, "no response");
        }
        result
    }

    /// Send `request` and return the payload of a successful envelope.
    pub async fn request<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        interceptor::parse_data(self.send(request).await?)
    }

    /// Send `request` and return the whole successful envelope.
    pub async fn request_envelope<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<ResponseEnvelope<T>, ApiError> {
        interceptor::parse_envelope(self.send(request).await?)
    }

    /// Build, intercept and send an arbitrary call.
    pub async fn call<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        auth: &AuthContext,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.core.build_request(method, path, body, auth)?;
        self.request(request).await
    }

    async fn ack(&self, request: HttpRequest) -> Result<String, ApiError> {
        interceptor::parse_ack(self.send(request).await?)
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginData, ApiError> {
        self.request(self.core.build_login(credentials)?).await
    }

    pub async fn register(&self, user: &User) -> Result<String, ApiError> {
        self.ack(self.core.build_register(user)?).await
    }

    pub async fn add_user(&self, auth: &AuthContext, user: &User) -> Result<String, ApiError> {
        self.ack(self.core.build_add_user(auth, user)?).await
    }

    pub async fn user_list(&self, auth: &AuthContext, query: &UserQuery) -> Result<Page<User>, ApiError> {
        self.request(self.core.build_user_list(auth, query)?).await
    }

    pub async fn user_info(&self, auth: &AuthContext, id: i64) -> Result<User, ApiError> {
        self.request(self.core.build_user_info(auth, id)?).await
    }

    pub async fn edit_user(&self, auth: &AuthContext, user: &User) -> Result<String, ApiError> {
        self.ack(self.core.build_edit_user(auth, user)?).await
    }

    pub async fn reset_password(&self, auth: &AuthContext, id: i64) -> Result<PasswordReset, ApiError> {
        self.request(self.core.build_reset_password(auth, id)?).await
    }

    pub async fn change_password(&self, auth: &AuthContext, change: &PasswordChange) -> Result<String, ApiError> {
        self.ack(self.core.build_change_password(auth, change)?).await
    }

    pub async fn article_list(
        &self,
        auth: &AuthContext,
        query: &ArticleQuery,
    ) -> Result<Page<ArticleSummary>, ApiError> {
        self.request(self.core.build_article_list(auth, query)?).await
    }

    pub async fn article_details(&self, auth: &AuthContext, id: i64) -> Result<Article, ApiError> {
        self.request(self.core.build_article_details(auth, id)?).await
    }

    pub async fn add_article(&self, auth: &AuthContext, article: &Article) -> Result<String, ApiError> {
        self.ack(self.core.build_add_article(auth, article)?).await
    }

    pub async fn edit_article(&self, auth: &AuthContext, article: &Article) -> Result<String, ApiError> {
        self.ack(self.core.build_edit_article(auth, article)?).await
    }

    pub async fn delete_article(&self, auth: &AuthContext, id: i64) -> Result<String, ApiError> {
        self.ack(self.core.build_delete_article(auth, id)?).await
    }

    pub async fn project_list(&self, auth: &AuthContext, query: &ProjectQuery) -> Result<Page<Project>, ApiError> {
        self.request(self.core.build_project_list(auth, query)?).await
    }

    pub async fn project_details(&self, auth: &AuthContext, id: i64) -> Result<Project, ApiError> {
        self.request(self.core.build_project_details(auth, id)?).await
    }

    pub async fn add_project(&self, auth: &AuthContext, project: &Project) -> Result<String, ApiError> {
        self.ack(self.core.build_add_project(auth, project)?).await
    }

    pub async fn edit_project(&self, auth: &AuthContext, project: &Project) -> Result<String, ApiError> {
        self.ack(self.core.build_edit_project(auth, project)?).await
    }

    pub async fn delete_project(&self, auth: &AuthContext, id: i64) -> Result<String, ApiError> {
        self.ack(self.core.build_delete_project(auth, id)?).await
    }
}
