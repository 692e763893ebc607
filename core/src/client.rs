//! Stateless HTTP request builder and response parser for the blog API.
//!
//! # Design
//! `BlogClient` holds the base URL, the timeout and the outbound interceptor,
//! and carries no mutable state between calls. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` (already passed through the
//! outbound stage) and a `parse_*` method that runs the inbound stage. The
//! host executes the actual HTTP round-trip in between.

use serde::Serialize;

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE};
use crate::interceptor::{self, AuthInterceptor};
use crate::types::{
    Article, ArticleQuery, ArticleSummary, IdRequest, LoginData, LoginRequest, Page, PasswordChange, PasswordReset,
    Project, ProjectQuery, User, UserQuery,
};

/// Endpoint paths, relative to the base URL.
pub mod paths {
    pub const LOGIN: &str = "/user/login";
    pub const REGISTER: &str = "/user/register";
    pub const ADD_USER: &str = "/user/add";
    pub const USER_LIST: &str = "/user/list";
    pub const USER_INFO: &str = "/user/info";
    pub const EDIT_USER: &str = "/user/edit";
    pub const RESET_PASSWORD: &str = "/user/resetPassword";
    pub const CHANGE_PASSWORD: &str = "/user/changePassword";
    pub const ARTICLE_LIST: &str = "/article/list";
    pub const ARTICLE_DETAILS: &str = "/article/details";
    pub const ADD_ARTICLE: &str = "/article/add";
    pub const EDIT_ARTICLE: &str = "/article/edit";
    pub const DELETE_ARTICLE: &str = "/article/delete";
    pub const PROJECT_LIST: &str = "/project/list";
    pub const PROJECT_DETAILS: &str = "/project/details";
    pub const ADD_PROJECT: &str = "/project/add";
    pub const EDIT_PROJECT: &str = "/project/edit";
    pub const DELETE_PROJECT: &str = "/project/delete";
}

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Synchronous, stateless client for the blog API.
#[derive(Debug, Clone)]
pub struct BlogClient {
    base_url: String,
    timeout_ms: u64,
    interceptor: AuthInterceptor,
}

impl BlogClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
            interceptor: AuthInterceptor::from_config(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build any request and run the outbound stage on it.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        auth: &AuthContext,
    ) -> Result<HttpRequest, ApiError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let (headers, body) = match body {
            Some(body) => {
                let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
                (vec![(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string())], Some(body))
            }
            None => (Vec::new(), None),
        };
        let mut request = HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            path,
            headers,
            body,
            timeout_ms: self.timeout_ms,
        };
        self.interceptor.on_request(&mut request, auth)?;
        Ok(request)
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B, auth: &AuthContext) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, path, Some(body), auth)
    }

    pub fn build_login(&self, credentials: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.post(paths::LOGIN, credentials, &AuthContext::anonymous())
    }

    pub fn build_register(&self, user: &User) -> Result<HttpRequest, ApiError> {
        self.post(paths::REGISTER, user, &AuthContext::anonymous())
    }

    pub fn build_add_user(&self, auth: &AuthContext, user: &User) -> Result<HttpRequest, ApiError> {
        self.post(paths::ADD_USER, user, auth)
    }

    pub fn build_user_list(&self, auth: &AuthContext, query: &UserQuery) -> Result<HttpRequest, ApiError> {
        self.post(paths::USER_LIST, query, auth)
    }

    pub fn build_user_info(&self, auth: &AuthContext, id: i64) -> Result<HttpRequest, ApiError> {
        self.post(paths::USER_INFO, &IdRequest { id }, auth)
    }

    /// Profile fields only; any password on `user` is ignored by the server.
    pub fn build_edit_user(&self, auth: &AuthContext, user: &User) -> Result<HttpRequest, ApiError> {
        self.post(paths::EDIT_USER, user, auth)
    }

    pub fn build_reset_password(&self, auth: &AuthContext, id: i64) -> Result<HttpRequest, ApiError> {
        self.post(paths::RESET_PASSWORD, &IdRequest { id }, auth)
    }

    /// Change the password of the account `auth` belongs to.
    pub fn build_change_password(&self, auth: &AuthContext, change: &PasswordChange) -> Result<HttpRequest, ApiError> {
        self.post(paths::CHANGE_PASSWORD, change, auth)
    }

    pub fn build_article_list(&self, auth: &AuthContext, query: &ArticleQuery) -> Result<HttpRequest, ApiError> {
        self.post(paths::ARTICLE_LIST, query, auth)
    }

    pub fn build_article_details(&self, auth: &AuthContext, id: i64) -> Result<HttpRequest, ApiError> {
        self.post(paths::ARTICLE_DETAILS, &IdRequest { id }, auth)
    }

    pub fn build_add_article(&self, auth: &AuthContext, article: &Article) -> Result<HttpRequest, ApiError> {
        self.post(paths::ADD_ARTICLE, article, auth)
    }

    pub fn build_edit_article(&self, auth: &AuthContext, article: &Article) -> Result<HttpRequest, ApiError> {
        self.post(paths::EDIT_ARTICLE, article, auth)
    }

    pub fn build_delete_article(&self, auth: &AuthContext, id: i64) -> Result<HttpRequest, ApiError> {
        self.post(paths::DELETE_ARTICLE, &IdRequest { id }, auth)
    }

    pub fn build_project_list(&self, auth: &AuthContext, query: &ProjectQuery) -> Result<HttpRequest, ApiError> {
        self.post(paths::PROJECT_LIST, query, auth)
    }

    pub fn build_project_details(&self, auth: &AuthContext, id: i64) -> Result<HttpRequest, ApiError> {
        self.post(paths::PROJECT_DETAILS, &IdRequest { id }, auth)
    }

    pub fn build_add_project(&self, auth: &AuthContext, project: &Project) -> Result<HttpRequest, ApiError> {
        self.post(paths::ADD_PROJECT, project, auth)
    }

    pub fn build_edit_project(&self, auth: &AuthContext, project: &Project) -> Result<HttpRequest, ApiError> {
        self.post(paths::EDIT_PROJECT, project, auth)
    }

    pub fn build_delete_project(&self, auth: &AuthContext, id: i64) -> Result<HttpRequest, ApiError> {
        self.post(paths::DELETE_PROJECT, &IdRequest { id }, auth)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginData, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_user_list(&self, response: HttpResponse) -> Result<Page<User>, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_user_info(&self, response: HttpResponse) -> Result<User, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_reset_password(&self, response: HttpResponse) -> Result<PasswordReset, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_article_list(&self, response: HttpResponse) -> Result<Page<ArticleSummary>, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_article_details(&self, response: HttpResponse) -> Result<Article, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_project_list(&self, response: HttpResponse) -> Result<Page<Project>, ApiError> {
        interceptor::parse_data(response)
    }

    pub fn parse_project_details(&self, response: HttpResponse) -> Result<Project, ApiError> {
        interceptor::parse_data(response)
    }

    /// Parse a call that returns no payload (register, add, edit, delete).
    /// Yields the server's message.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<String, ApiError> {
        interceptor::parse_ack(response)
    }
}
