//! network::client
//!
//! The resilient HTTP transport.
//!
//! # Design
//!
//! Every outbound request carries a `User-Agent`, an `x-request-id`
//! correlation header, and the caller-supplied `Authorization` credential
//! when present. Attempts are sequential; a failed attempt is retried after
//! a short pause when the failure is connection-level or the response
//! status is >= 500, provided the body can be replayed.

use std::time::Duration;

use reqwest::header::{HeaderMap, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use thiserror::Error;
use url::Url;

use super::body::RequestBody;
use super::logger::HttpLogger;
use super::settings::HttpClientSettings;
use super::Authorization;

/// Pause between attempts.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Connection-level and server-side transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("error sending request: {0}")]
    Network(String),

    /// The service kept responding with a retryable status until the
    /// attempt budget ran out.
    #[error("service returned status code '{status}' and body '{body}'")]
    Server { status: u16, body: String },
}

/// An outbound request, independent of the underlying HTTP library.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<Authorization>,
    pub header: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, RequestBody::empty())
    }

    pub fn post(url: Url, body: RequestBody) -> Self {
        Self::new(Method::POST, url, body)
    }

    pub fn new(method: Method, url: Url, body: RequestBody) -> Self {
        Self {
            method,
            url,
            authorization: None,
            header: Vec::new(),
            body,
        }
    }

    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.push((name.into(), value.into()));
        self
    }
}

/// A fully read response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub header: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response body as lossy UTF-8 text.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client with bounded retries and replay-safe request bodies.
pub struct HttpClient {
    settings: HttpClientSettings,
    logger: HttpLogger,
}

impl HttpClient {
    pub fn new(settings: HttpClientSettings) -> Self {
        Self {
            settings,
            logger: HttpLogger::new(),
        }
    }

    /// Send a request, retrying transient failures up to the attempt budget.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = self.build_client()?;
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_error: Option<TransportError> = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                if !request.body.is_replayable() {
                    break;
                }
                tokio::time::sleep(RETRY_PAUSE).await;
            }
            let Some(body) = request.body.next_attempt() else {
                break;
            };

            match self.attempt(&client, request, body).await {
                Ok(response) if response.status >= 500 => {
                    last_error = Some(TransportError::Server {
                        status: response.status,
                        body: response.body_text(),
                    });
                }
                Ok(response) => return Ok(response),
                Err(error) => last_error = Some(error),
            }
        }

        Err(last_error
            .unwrap_or_else(|| TransportError::Network("no attempt was made".to_string())))
    }

    async fn attempt(
        &self,
        client: &reqwest::Client,
        request: &HttpRequest,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .header(USER_AGENT, user_agent())
            .header("x-request-id", &self.settings.operation_id);
        for (name, value) in &request.header {
            builder = builder.header(name, value);
        }
        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization.header_value());
        }

        if self.settings.debug {
            self.logger.log_request(
                request.method.as_str(),
                request.url.as_str(),
                &self.logged_headers(request),
                request.body.logged_bytes(),
            );
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let header = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("error reading response: {}", e)))?
            .to_vec();

        if self.settings.debug {
            self.logger.log_response(status, &header, &body);
        }

        Ok(HttpResponse {
            status,
            header,
            body,
        })
    }

    // Headers mirrored into the debug log. The authorization value is
    // intentionally left out.
    fn logged_headers(&self, request: &HttpRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = self.settings.operation_id.parse() {
            headers.insert("x-request-id", value);
        }
        for (name, value) in &request.header {
            if let (Ok(name), Ok(value)) = (
                name.parse::<reqwest::header::HeaderName>(),
                value.parse::<reqwest::header::HeaderValue>(),
            ) {
                headers.insert(name, value);
            }
        }
        headers
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .timeout(self.settings.timeout)
            .danger_accept_invalid_certs(self.settings.insecure)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

fn user_agent() -> String {
    format!(
        "uipathcli/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
