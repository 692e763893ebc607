//! The I/O side of the blog API client.
//!
//! # Overview
//! `blog-api-core` builds and interprets requests without touching the
//! network. This crate executes them: `ApiClient::request` is the async entry
//! point feature code calls, `Session` keeps the session token in a
//! `TokenStore` and supplies the `AuthContext` for each call.

pub mod client;
pub mod config;
pub mod session;
pub mod store;
pub mod transport;

pub use client::ApiClient;
pub use session::Session;
pub use store::FileTokenStore;
pub use transport::{Transport, UreqTransport};
