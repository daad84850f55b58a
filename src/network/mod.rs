//! network - Resilient HTTP transport
//!
//! An abstraction over the reqwest client which adds resiliency through
//! bounded retries and makes sure every request carries the common headers
//! (`User-Agent`, `x-request-id`, and the synthesized `Authorization`
//! header).
//!
//! # Retry Policy
//!
//! A request is attempted up to [`HttpClientSettings::max_attempts`] times.
//! Connection-level failures and responses with status >= 500 are retried;
//! statuses in `[400, 500)` are returned as-is for the caller to interpret.
//! Retries are strictly sequential for a single logical request.
//!
//! # Replay Safety
//!
//! Request bodies are buffered up to a 10 MiB limit so a retry replays the
//! exact bytes already sent. Bodies beyond the limit are sent as a
//! single-shot stream and never retried; the first error becomes terminal.
//!
//! # Components
//!
//! - [`HttpClient`] - The transport itself
//! - [`HttpClientSettings`] - Debug/insecure flags, timeout, attempt budget
//! - [`RequestBody`] - Replay-bounded request body
//! - [`HttpLogger`] - Debug-mode request/response mirror

mod body;
mod client;
mod logger;
mod settings;

pub use body::{RequestBody, BODY_BUFFER_LIMIT};
pub use client::{HttpClient, HttpRequest, HttpResponse, TransportError};
pub use logger::HttpLogger;
pub use settings::HttpClientSettings;

/// The value pair of an HTTP authorization header.
///
/// Example: `Authorization: Bearer <jwt-bearer-token>` has type `Bearer`
/// and the token text as value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub auth_type: String,
    pub value: String,
}

impl Authorization {
    pub fn new(auth_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            auth_type: auth_type.into(),
            value: value.into(),
        }
    }

    /// A `Bearer` authorization.
    pub fn bearer(value: impl Into<String>) -> Self {
        Self::new("Bearer", value)
    }

    /// The full header value, e.g. `"Bearer <token>"`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.auth_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_value() {
        let auth = Authorization::bearer("my-token");
        assert_eq!(auth.header_value(), "Bearer my-token");
    }

    #[test]
    fn custom_type_header_value() {
        let auth = Authorization::new("Basic", "dXNlcjpwYXNz");
        assert_eq!(auth.header_value(), "Basic dXNlcjpwYXNz");
    }
}
