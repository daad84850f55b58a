//! auth::context
//!
//! Shared per-call types flowing through the authenticator chain.
//!
//! An [`AuthenticatorContext`] is created once per outbound call by the
//! executor and handed to every strategy in turn. Strategies that apply
//! mutate the request header map in place; the header map is the primary
//! channel by which the credential reaches the final HTTP request. The
//! context serializes as camelCase JSON because it is also the stdin wire
//! format of external authenticator subprocesses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::network::Authorization;

/// Untyped strategy configuration as loaded from profile config or plugins.
///
/// Each strategy validates the fields it needs into a typed config struct
/// exactly once (see [`super::config`]).
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// The request which needs to be authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorRequest {
    /// Target URL of the outbound call.
    pub url: String,
    /// Header map; strategies that succeed insert `Authorization` here.
    #[serde(default)]
    pub header: HashMap<String, String>,
}

impl AuthenticatorRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            header: HashMap::new(),
        }
    }
}

/// Information required for authenticating one outbound call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorContext {
    /// Auth-strategy type tag from profile config (e.g. "credentials").
    #[serde(rename = "type")]
    pub auth_type: String,
    /// Strategy-specific configuration values.
    #[serde(default)]
    pub config: ConfigMap,
    /// Identity-service base URI, when configured explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_uri: Option<Url>,
    /// Correlation id attached to every request of this CLI invocation.
    pub operation_id: String,
    /// Disable TLS certificate verification.
    pub insecure: bool,
    /// Mirror HTTP traffic into the debug logger.
    pub debug: bool,
    /// The request being authenticated.
    pub request: AuthenticatorRequest,
}

impl AuthenticatorContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth_type: impl Into<String>,
        config: ConfigMap,
        identity_uri: Option<Url>,
        operation_id: impl Into<String>,
        insecure: bool,
        debug: bool,
        request: AuthenticatorRequest,
    ) -> Self {
        Self {
            auth_type: auth_type.into(),
            config,
            identity_uri,
            operation_id: operation_id.into(),
            insecure,
            debug,
            request,
        }
    }

    /// Set the `Authorization` header on the request being authenticated.
    pub fn set_authorization(&mut self, authorization: &Authorization) {
        self.request
            .header
            .insert("Authorization".to_string(), authorization.header_value());
    }
}

/// Credential for authenticating with platform APIs, typically a JWT
/// bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    /// Scheme of the credential, e.g. `Bearer`.
    #[serde(rename = "type")]
    pub token_type: String,
    /// The opaque token text.
    pub value: String,
}

impl AuthToken {
    pub fn new(token_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            token_type: token_type.into(),
            value: value.into(),
        }
    }

    /// A `Bearer` token.
    pub fn bearer(value: impl Into<String>) -> Self {
        Self::new("Bearer", value)
    }

    /// The authorization header pair for this token.
    pub fn authorization(&self) -> Authorization {
        Authorization::new(&self.token_type, &self.value)
    }
}

// Custom Debug so token values never leak through debug output.
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token_type", &self.token_type)
            .field("value", &"**redacted**")
            .finish()
    }
}
