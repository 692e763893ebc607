//! The two interception stages every call passes through.
//!
//! # Design
//! Outbound: `AuthInterceptor::on_request` attaches the session token to every
//! request except the login call. Inbound: `parse_envelope` turns a raw
//! response into either a success envelope or an `ApiError`. Neither stage
//! holds state or notifies anyone; they may run any number of times.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::auth::AuthContext;
use crate::config::{AuthScheme, ClientConfig};
use crate::envelope::{RawEnvelope, ResponseEnvelope, SUCCESS_STATUS};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, AUTHORIZATION};

/// Message used when a failed envelope carries none.
const FALLBACK_MESSAGE: &str = "Error";

/// Outbound stage: token attachment.
#[derive(Debug, Clone)]
pub struct AuthInterceptor {
    login_path: String,
    scheme: AuthScheme,
}

impl AuthInterceptor {
    pub fn new(login_path: &str, scheme: AuthScheme) -> Self {
        Self {
            login_path: normalize_path(login_path).to_string(),
            scheme,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.login_path, config.auth_scheme)
    }

    pub fn is_login(&self, path: &str) -> bool {
        normalize_path(path) == self.login_path
    }

    /// Set or clear `Authorization` on `request`.
    ///
    /// Fails only when the token cannot be carried in a header; the request
    /// must then not be sent.
    pub fn on_request(&self, request: &mut HttpRequest, auth: &AuthContext) -> Result<(), ApiError> {
        if self.is_login(&request.path) {
            request.remove_header(AUTHORIZATION);
            debug!(path = %request.path, "login request, no token attached");
            return Ok(());
        }
        match auth.token() {
            Some(token) => {
                let value = self.scheme.header_value(token);
                if !is_valid_header_value(&value) {
                    return Err(ApiError::InvalidHeader(AUTHORIZATION.to_string()));
                }
                request.set_header(AUTHORIZATION, value);
                debug!(path = %request.path, "token attached");
            }
            None => {
                request.remove_header(AUTHORIZATION);
                debug!(path = %request.path, "no token stored, sending unauthenticated");
            }
        }
        Ok(())
    }
}

impl Default for AuthInterceptor {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Inbound stage: interpret `response` as an envelope.
///
/// Only a JSON object is an envelope; any other body is a deserialization
/// error on 2xx and an `Http` error otherwise.
pub fn parse_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<ResponseEnvelope<T>, ApiError> {
    let raw = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(fields)) => {
            serde_json::from_value::<RawEnvelope>(Value::Object(fields)).map_err(|e| e.to_string())
        }
        Ok(other) => Err(format!("response body is not an object: {other}")),
        Err(e) => Err(e.to_string()),
    };
    let raw = match raw {
        Ok(raw) => raw,
        Err(reason) if response.is_success() => return Err(ApiError::Deserialization(reason)),
        Err(_) => {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            })
        }
    };

    let Some(status) = raw.status else {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        return Err(ApiError::Deserialization(
            "response envelope has no status".to_string(),
        ));
    };

    let message = raw.message.unwrap_or_default();
    if status != SUCCESS_STATUS {
        debug!(status, message = %message, "application error");
        let message = if message.is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        };
        return Err(ApiError::Application { status, message });
    }

    let data = serde_json::from_value(raw.data).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    Ok(ResponseEnvelope { status, message, data })
}

/// Inbound stage returning only the payload.
pub fn parse_data<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    parse_envelope(response).map(|envelope| envelope.data)
}

/// Inbound stage for calls whose payload is irrelevant. Returns the message.
pub fn parse_ack(response: HttpResponse) -> Result<String, ApiError> {
    parse_envelope::<serde::de::IgnoredAny>(response).map(|envelope| envelope.message)
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_start_matches('/').trim_end_matches('/')
}

fn is_valid_header_value(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (b >= 0x20 && b != 0x7f))
}
