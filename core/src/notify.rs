//! User-visible notices for failed calls.
//!
//! The interceptors only return errors. Whether and how a failure is shown is
//! decided by the presentation layer, which routes results through
//! [`surface`] with a [`Notifier`] of its choosing.

use tracing::warn;

use crate::error::ApiError;

/// How long a transient notice stays visible.
pub const DEFAULT_NOTICE_MS: u64 = 2000;

/// An error message to show for a short while.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration_ms: u64,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration_ms: DEFAULT_NOTICE_MS,
        }
    }
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Notice::error(err.message())
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        warn!(message = %notice.message, duration_ms = notice.duration_ms, "request failed");
    }
}

/// Show one error notice if `result` failed, then hand the result back.
pub fn surface<T>(result: Result<T, ApiError>, notifier: &dyn Notifier) -> Result<T, ApiError> {
    if let Err(err) = &result {
        notifier.notify(Notice::from(err));
    }
    result
}
