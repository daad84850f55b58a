//! network::settings
//!
//! Per-call configuration for the [`HttpClient`](super::HttpClient).

use std::time::Duration;

/// Default number of attempts for a single logical request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default per-request timeout until response headers are available.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings controlling transport behavior for one client instance.
#[derive(Debug, Clone)]
pub struct HttpClientSettings {
    /// Mirror request/response bodies into the debug logger.
    pub debug: bool,
    /// Correlation id attached to every request as `x-request-id`.
    pub operation_id: String,
    /// Timeout for a single attempt.
    pub timeout: Duration,
    /// Upper bound on sequential attempts for one request.
    pub max_attempts: u32,
    /// Disable TLS certificate verification.
    pub insecure: bool,
}

impl HttpClientSettings {
    pub fn new(
        debug: bool,
        operation_id: impl Into<String>,
        timeout: Duration,
        max_attempts: u32,
        insecure: bool,
    ) -> Self {
        Self {
            debug,
            operation_id: operation_id.into(),
            timeout,
            max_attempts,
            insecure,
        }
    }

    /// The same settings with debug logging turned off.
    ///
    /// Used by callers that log a redacted copy of the traffic themselves
    /// and must keep secrets out of the transport's mirror.
    pub fn without_debug(&self) -> Self {
        Self {
            debug: false,
            ..self.clone()
        }
    }
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            debug: false,
            operation_id: String::new(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            insecure: false,
        }
    }
}
