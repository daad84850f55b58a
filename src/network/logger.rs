//! network::logger
//!
//! Debug-mode mirror of HTTP traffic.
//!
//! Bodies are truncated at 1 MiB before logging; JSON bodies are
//! pretty-printed for readability. Output goes to standard error so it
//! never mixes with command output.

use reqwest::header::HeaderMap;

/// Maximum number of body bytes mirrored into the log.
const LOGGING_LIMIT: usize = 1024 * 1024;

/// Writes requests and responses to standard error when debug mode is on.
#[derive(Debug, Default, Clone)]
pub struct HttpLogger;

impl HttpLogger {
    pub fn new() -> Self {
        Self
    }

    /// Log an outbound request.
    pub fn log_request(&self, method: &str, url: &str, headers: &HeaderMap, body: &[u8]) {
        eprintln!("{} {} HTTP/1.1", method, url);
        self.log_headers(headers);
        self.log_body(body);
        eprintln!();
    }

    /// Log an inbound response.
    pub fn log_response(&self, status: u16, headers: &HeaderMap, body: &[u8]) {
        eprintln!("HTTP/1.1 {}", status);
        self.log_headers(headers);
        self.log_body(body);
        eprintln!();
    }

    /// Log an outbound token-endpoint request whose form body has already
    /// had credential values masked.
    pub fn log_form_request(&self, url: &url::Url, redacted_form: &str) {
        eprintln!("POST {} HTTP/1.1", url);
        eprintln!("Content-Type: application/x-www-form-urlencoded");
        eprintln!();
        eprintln!("{}", redacted_form);
        eprintln!();
    }

    fn log_headers(&self, headers: &HeaderMap) {
        for (name, value) in headers {
            eprintln!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
    }

    fn log_body(&self, body: &[u8]) {
        if body.is_empty() {
            return;
        }
        eprintln!();
        eprintln!("{}", format_body(body));
    }
}

/// Render a body for logging: truncate at the logging limit and
/// pretty-print when it parses as JSON.
pub(crate) fn format_body(body: &[u8]) -> String {
    let truncated = &body[..body.len().min(LOGGING_LIMIT)];
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(truncated) {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return pretty;
        }
    }
    String::from_utf8_lossy(truncated).into_owned()
}
