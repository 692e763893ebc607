//! Sans-IO client core for the blog API.
//!
//! # Overview
//! Builds `HttpRequest` values and interprets `HttpResponse` values without
//! touching the network (host-does-IO pattern). Every request passes through
//! two interception stages: the outbound stage attaches the session token,
//! the inbound stage unwraps the `{status, message, data}` envelope and turns
//! anything but status 200 into an `ApiError`.
//!
//! # Design
//! - `BlogClient` is stateless; the session token arrives per call in an
//!   explicit `AuthContext` rather than being read from ambient storage.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit.
//! - Interceptors never show anything to the user; `notify::surface` lets the
//!   presentation layer turn a failed result into exactly one notice.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod http;
pub mod interceptor;
pub mod notify;
pub mod types;
pub mod views;

pub use auth::{AuthContext, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use client::BlogClient;
pub use config::{AuthScheme, ClientConfig, ConfigError, TokenScope};
pub use envelope::ResponseEnvelope;
pub use error::{ApiError, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::AuthInterceptor;
pub use notify::{Notice, Notifier, TracingNotifier};
pub use types::{
    Article, ArticleQuery, ArticleSummary, IdRequest, LoginData, LoginRequest, Page, PasswordChange, PasswordReset,
    Project, ProjectQuery, User, UserQuery,
};
pub use views::{TagView, ViewHistory};
