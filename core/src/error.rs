//! Error types for the blog API client.
//!
//! # Design
//! `Application` and `Transport` are the two failure kinds callers meet in
//! practice: the server answered with a non-success envelope, or no answer
//! arrived at all. Both display as a plain human-readable message so the
//! presentation layer can show them without inspecting the variant.
//! The remaining variants cover malformed traffic and local failures.

use thiserror::Error;

/// Why a request produced no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The configured timeout elapsed.
    Timeout,
    /// DNS resolution or the TCP/TLS connect failed.
    Connect,
    Other,
}

/// Errors returned by the client, from either interceptor stage or the host.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with an envelope whose status is not 200.
    #[error("{message}")]
    Application { status: i64, message: String },

    /// No response was received.
    #[error("{message}")]
    Transport { kind: TransportErrorKind, message: String },

    /// A non-2xx response whose body is not an envelope.
    #[error("Error {status}: {body}")]
    Http { status: u16, body: String },

    /// The outbound stage could not produce a legal header value.
    #[error("invalid header value for {0}")]
    InvalidHeader(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The token store could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        ApiError::Transport {
            kind,
            message: message.into(),
        }
    }

    /// The human-readable message shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Status reported by the server, from the envelope or the transport.
    pub fn status(&self) -> Option<i64> {
        match self {
            ApiError::Application { status, .. } => Some(*status),
            ApiError::Http { status, .. } => Some(i64::from(*status)),
            _ => None,
        }
    }

    /// The caller should send the user back to the login page.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Transport {
                kind: TransportErrorKind::Timeout,
                ..
            }
        )
    }
}
