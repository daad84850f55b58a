//! auth::identity
//!
//! Client for the identity-service token endpoint.
//!
//! # Design
//!
//! All grant types go through a single [`IdentityClient::get_token`] call:
//! it checks the token cache, POSTs a form-encoded request to
//! `{identity}/connect/token` when needed, and writes fresh access tokens
//! back to the cache with a safety margin subtracted from their lifetime
//! so a token read from the cache is never about to expire mid-request.
//!
//! Cache keys encode every input that influences the issued token, so
//! changing the client, the scopes, or the host can never surface a stale
//! token minted for different inputs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::cache::Cache;
use crate::network::{HttpClient, HttpClientSettings, HttpLogger, HttpRequest, RequestBody};

use super::errors::AuthError;

/// Subtracted from `expires_in` when caching, so cached tokens retire
/// before the identity service would reject them.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

const GET_TOKEN_TIMEOUT: Duration = Duration::from_secs(60);
const GET_TOKEN_MAX_ATTEMPTS: u32 = 3;

/// The credential material for one token request.
#[derive(Debug, Clone)]
pub enum TokenGrant {
    ClientCredentials {
        grant_type: String,
        client_id: String,
        client_secret: String,
    },
    AuthorizationCode {
        client_id: String,
        client_secret: Option<String>,
        code: String,
        code_verifier: String,
        redirect_uri: String,
    },
    RefreshToken {
        client_id: String,
        client_secret: Option<String>,
        refresh_token: String,
    },
}

#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub base_uri: Url,
    pub grant: TokenGrant,
    pub scopes: String,
    pub properties: BTreeMap<String, String>,
    pub operation_id: String,
    pub insecure: bool,
}

impl TokenRequest {
    /// The cache key for the access token this request would mint.
    pub fn cache_key(&self) -> String {
        match &self.grant {
            TokenGrant::ClientCredentials {
                grant_type,
                client_id,
                client_secret,
            } => bearer_cache_key(
                &self.base_uri,
                grant_type,
                &self.scopes,
                client_id,
                client_secret,
                &self.properties,
            ),
            TokenGrant::AuthorizationCode { client_id, .. }
            | TokenGrant::RefreshToken { client_id, .. } => {
                oauth_access_token_cache_key(&self.base_uri, client_id, &self.scopes)
            }
        }
    }

    fn form_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match &self.grant {
            TokenGrant::ClientCredentials {
                grant_type,
                client_id,
                client_secret,
            } => {
                pairs.push(("grant_type", grant_type.clone()));
                pairs.push(("client_id", client_id.clone()));
                pairs.push(("client_secret", client_secret.clone()));
                if !self.scopes.is_empty() {
                    pairs.push(("scope", self.scopes.clone()));
                }
            }
            TokenGrant::AuthorizationCode {
                client_id,
                client_secret,
                code,
                code_verifier,
                redirect_uri,
            } => {
                pairs.push(("grant_type", "authorization_code".to_string()));
                pairs.push(("client_id", client_id.clone()));
                if let Some(secret) = client_secret {
                    pairs.push(("client_secret", secret.clone()));
                }
                pairs.push(("code", code.clone()));
                pairs.push(("code_verifier", code_verifier.clone()));
                pairs.push(("redirect_uri", redirect_uri.clone()));
            }
            TokenGrant::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => {
                pairs.push(("grant_type", "refresh_token".to_string()));
                pairs.push(("client_id", client_id.clone()));
                if let Some(secret) = client_secret {
                    pairs.push(("client_secret", secret.clone()));
                }
                pairs.push(("refresh_token", refresh_token.clone()));
            }
        }
        pairs
    }

    fn form_body(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.form_pairs() {
            serializer.append_pair(name, &value);
        }
        for (name, value) in &self.properties {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// The form body with credential values masked, for debug output.
    fn redacted_form(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.form_pairs() {
            match name {
                "client_secret" | "refresh_token" | "code" | "code_verifier" => {
                    serializer.append_pair(name, "**redacted**");
                }
                _ => {
                    serializer.append_pair(name, &value);
                }
            }
        }
        for (name, value) in &self.properties {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

/// The outcome of a token request; `expires_in` already has the cache
/// margin applied when served from cache.
#[derive(Clone)]
pub struct TokenResult {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub from_cache: bool,
}

impl std::fmt::Debug for TokenResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResult")
            .field("access_token", &"**redacted**")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "**redacted**"))
            .field("from_cache", &self.from_cache)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponseBody {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct IdentityClient {
    cache: Arc<dyn Cache>,
    debug: bool,
}

impl IdentityClient {
    pub fn new(cache: Arc<dyn Cache>, debug: bool) -> Self {
        Self { cache, debug }
    }

    pub async fn get_token(&self, request: &TokenRequest) -> Result<TokenResult, AuthError> {
        let cache_key = request.cache_key();
        if let Some((value, expires_at)) = self.cache.get(&cache_key) {
            let now = chrono::Utc::now().timestamp();
            return Ok(TokenResult {
                access_token: value,
                expires_in: expires_at - now,
                refresh_token: None,
                from_cache: true,
            });
        }

        let result = self.request_token(request).await?;
        if result.expires_in > TOKEN_EXPIRY_MARGIN_SECS {
            self.cache.set(
                &cache_key,
                &result.access_token,
                result.expires_in - TOKEN_EXPIRY_MARGIN_SECS,
            );
        }
        Ok(result)
    }

    async fn request_token(&self, request: &TokenRequest) -> Result<TokenResult, AuthError> {
        let token_url = token_endpoint(&request.base_uri)?;
        let logger = HttpLogger::new();
        if self.debug {
            logger.log_form_request(&token_url, &request.redacted_form());
        }

        let settings = HttpClientSettings::new(
            self.debug,
            &request.operation_id,
            GET_TOKEN_TIMEOUT,
            GET_TOKEN_MAX_ATTEMPTS,
            request.insecure,
        );
        // The transport must not mirror the raw traffic; this client logs
        // redacted copies of the form and the response itself.
        let client = HttpClient::new(settings.without_debug());
        let http_request = HttpRequest::post(token_url, RequestBody::from_text(request.form_body()))
            .with_header("Content-Type", "application/x-www-form-urlencoded");
        let response = client.send(&http_request).await?;
        if self.debug {
            logger.log_response(
                response.status,
                &response.header,
                &redacted_response_body(&response.body),
            );
        }
        if response.status >= 400 {
            return Err(AuthError::Server {
                status: response.status,
                body: response.body_text(),
            });
        }
        let body: TokenResponseBody = serde_json::from_slice(&response.body).map_err(|err| {
            AuthError::Internal(format!("could not parse token service response: {}", err))
        })?;
        Ok(TokenResult {
            access_token: body.access_token,
            expires_in: body.expires_in,
            refresh_token: body.refresh_token,
            from_cache: false,
        })
    }
}

/// A token response body with the `refresh_token` value masked; anything
/// that is not a JSON object passes through unchanged.
fn redacted_response_body(body: &[u8]) -> Vec<u8> {
    let Ok(serde_json::Value::Object(mut map)) = serde_json::from_slice(body) else {
        return body.to_vec();
    };
    if let Some(value) = map.get_mut("refresh_token") {
        *value = serde_json::Value::String("**redacted**".to_string());
    }
    serde_json::to_vec(&serde_json::Value::Object(map)).unwrap_or_else(|_| body.to_vec())
}

fn token_endpoint(base_uri: &Url) -> Result<Url, AuthError> {
    let base = base_uri.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/connect/token", base))
        .map_err(|_| AuthError::configuration("identity uri", base_uri.as_str()))
}

/// Builds `{base}/connect/authorize` with the given query parameters.
pub(crate) fn authorize_endpoint(
    base_uri: &Url,
    params: &[(&str, &str)],
) -> Result<Url, AuthError> {
    let base = base_uri.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!("{}/connect/authorize", base))
        .map_err(|_| AuthError::configuration("identity uri", base_uri.as_str()))?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url)
}

fn uri_authority(uri: &Url) -> String {
    let host = uri.host_str().unwrap_or_default();
    match uri.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

pub(crate) fn bearer_cache_key(
    base_uri: &Url,
    grant_type: &str,
    scopes: &str,
    client_id: &str,
    client_secret: &str,
    properties: &BTreeMap<String, String>,
) -> String {
    let props = properties
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "beareraccesstoken|{}|{}|{}|{}|{}|{}|{}",
        base_uri.scheme(),
        uri_authority(base_uri),
        grant_type,
        scopes,
        client_id,
        client_secret,
        props
    )
}

pub(crate) fn oauth_access_token_cache_key(base_uri: &Url, client_id: &str, scopes: &str) -> String {
    format!(
        "oauthaccesstoken|{}|{}|{}|{}",
        base_uri.scheme(),
        uri_authority(base_uri),
        client_id,
        scopes
    )
}

pub(crate) fn oauth_refresh_token_cache_key(
    base_uri: &Url,
    client_id: &str,
    scopes: &str,
) -> String {
    format!(
        "oauthrefreshtoken|{}|{}|{}|{}",
        base_uri.scheme(),
        uri_authority(base_uri),
        client_id,
        scopes
    )
}
