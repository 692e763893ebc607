//! Executes `HttpRequest` values over the network.
//!
//! # Design
//! `Transport` is synchronous; `ApiClient` moves each call onto tokio's
//! blocking pool so callers stay non-blocking. `UreqTransport` disables ureq's
//! status-code-as-error behaviour so 4xx/5xx responses come back as data and
//! the inbound interceptor decides what they mean. Only "no response at all"
//! is an error here. A body is sent whenever the request has one, whatever
//! the method.

use std::io;
use std::time::Duration;

use blog_api_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, TransportErrorKind};

/// Performs one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout_ms: u64,
}

impl UreqTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            agent: agent(timeout_ms),
            timeout_ms,
        }
    }
}

fn agent(timeout_ms: u64) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_millis(timeout_ms)))
        .build()
        .new_agent()
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let one_off;
        let agent = if request.timeout_ms == self.timeout_ms {
            &self.agent
        } else {
            one_off = agent(request.timeout_ms);
            &one_off
        };

        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, Some(body)) => with_headers(agent.get(url), headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Get, None) => with_headers(agent.get(url), headers).call(),
            (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(url), headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Delete, None) => with_headers(agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), headers).send(body.as_bytes()),
            (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
        };
        let mut response = result.map_err(|e| transport_error(e, request.timeout_ms))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| transport_error(e, request.timeout_ms))?;

        Ok(HttpResponse { status, headers, body })
    }
}

/// Map a ureq failure onto the transport error contract.
fn transport_error(err: ureq::Error, timeout_ms: u64) -> ApiError {
    let kind = classify(&err);
    let message = match kind {
        TransportErrorKind::Timeout => format!("timeout of {timeout_ms}ms exceeded"),
        TransportErrorKind::Connect => format!("Network Error: {err}"),
        TransportErrorKind::Other => err.to_string(),
    };
    ApiError::transport(kind, message)
}

fn classify(err: &ureq::Error) -> TransportErrorKind {
    match err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(e) => match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportErrorKind::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable => TransportErrorKind::Connect,
            _ => TransportErrorKind::Other,
        },
        _ => TransportErrorKind::Other,
    }
}
