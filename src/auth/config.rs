//! auth::config
//!
//! Typed per-strategy configuration.
//!
//! # Design
//!
//! Profile configuration arrives as an untyped key/value map (it is also
//! what external authenticators receive verbatim). Each strategy validates
//! the fields it needs into a strongly-typed struct exactly once, before
//! doing any work; a validation failure is an
//! [`AuthError::Configuration`](super::AuthError) naming the offending
//! field. Environment variables override or substitute for the
//! corresponding config fields.

use std::collections::BTreeMap;

use url::Url;

use super::context::{AuthenticatorContext, ConfigMap};
use super::errors::AuthError;

pub const CLIENT_ID_ENV_VAR: &str = "UIPATH_CLIENT_ID";
pub const CLIENT_SECRET_ENV_VAR: &str = "UIPATH_CLIENT_SECRET";
pub const PAT_ENV_VAR: &str = "UIPATH_PAT";
pub const GRANT_TYPE_ENV_VAR: &str = "UIPATH_AUTH_GRANT_TYPE";
pub const SCOPES_ENV_VAR: &str = "UIPATH_AUTH_SCOPES";
pub const REDIRECT_URI_ENV_VAR: &str = "UIPATH_AUTH_REDIRECT_URI";

/// Configuration for the client-credentials strategy.
#[derive(Debug, Clone)]
pub struct BearerConfig {
    pub grant_type: String,
    pub scopes: String,
    pub client_id: String,
    pub client_secret: String,
    pub properties: BTreeMap<String, String>,
    pub identity_uri: Url,
}

impl BearerConfig {
    pub fn from_context(ctx: &AuthenticatorContext) -> Result<Self, AuthError> {
        let grant_type = optional_string(&ctx.config, "grantType", Some(GRANT_TYPE_ENV_VAR))?
            .unwrap_or_else(|| "client_credentials".to_string());
        let scopes =
            optional_string(&ctx.config, "scopes", Some(SCOPES_ENV_VAR))?.unwrap_or_default();
        let client_id = required_string(&ctx.config, "clientId", Some(CLIENT_ID_ENV_VAR))?;
        let client_secret =
            required_string(&ctx.config, "clientSecret", Some(CLIENT_SECRET_ENV_VAR))?;
        let properties = properties(&ctx.config)?;
        let identity_uri = resolve_identity_uri(ctx)?;
        Ok(Self {
            grant_type,
            scopes,
            client_id,
            client_secret,
            properties,
            identity_uri,
        })
    }
}

/// Configuration for the interactive OAuth strategy.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    /// Confidential clients also carry a secret; public clients do not.
    pub client_secret: Option<String>,
    pub redirect_uri: Url,
    pub scopes: String,
    pub offline_access: bool,
    pub identity_uri: Url,
}

impl OAuthConfig {
    pub fn from_context(ctx: &AuthenticatorContext) -> Result<Self, AuthError> {
        let client_id = required_string(&ctx.config, "clientId", Some(CLIENT_ID_ENV_VAR))?;
        let client_secret =
            optional_string(&ctx.config, "clientSecret", Some(CLIENT_SECRET_ENV_VAR))?;
        let redirect_uri =
            required_string(&ctx.config, "redirectUri", Some(REDIRECT_URI_ENV_VAR))?;
        let redirect_uri = Url::parse(&redirect_uri)
            .map_err(|_| AuthError::configuration("redirectUri", &redirect_uri))?;
        let mut scopes = required_string(&ctx.config, "scopes", Some(SCOPES_ENV_VAR))?;
        let offline_access = optional_bool(&ctx.config, "offlineAccess", true)?;
        if offline_access {
            scopes = format!("{} offline_access", scopes);
        }
        let identity_uri = resolve_identity_uri(ctx)?;
        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes,
            offline_access,
            identity_uri,
        })
    }
}

/// Configuration values for the external authenticator.
#[derive(Debug, Clone)]
pub struct ExternalConfig {
    /// Display name used in error messages.
    pub name: String,
    /// Executable path; relative paths resolve against the CLI's own
    /// executable directory.
    pub path: String,
}

impl ExternalConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The identity-service base URI for a context: the explicitly configured
/// one, or `{scheme}://{host}/identity_` derived from the request URL.
pub(crate) fn resolve_identity_uri(ctx: &AuthenticatorContext) -> Result<Url, AuthError> {
    if let Some(uri) = &ctx.identity_uri {
        return Ok(uri.clone());
    }
    let request_url = Url::parse(&ctx.request.url)
        .map_err(|_| AuthError::configuration("request url", &ctx.request.url))?;
    let host = request_url
        .host_str()
        .ok_or_else(|| AuthError::configuration("request url", &ctx.request.url))?;
    let authority = match request_url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let derived = format!("{}://{}/identity_", request_url.scheme(), authority);
    Url::parse(&derived).map_err(|_| AuthError::configuration("request url", &ctx.request.url))
}

/// Whether a config field or its environment override carries a value.
pub(crate) fn value_set(config: &ConfigMap, name: &str, env_var: &str) -> bool {
    env_value(env_var).is_some() || config.contains_key(name)
}

pub(crate) fn env_value(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// A required string field: the env override wins, then the config value.
/// Missing, empty, or mistyped values fail with the field name.
pub(crate) fn required_string(
    config: &ConfigMap,
    name: &str,
    env_var: Option<&str>,
) -> Result<String, AuthError> {
    if let Some(value) = env_var.and_then(env_value) {
        return Ok(value);
    }
    match config.get(name) {
        Some(serde_json::Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(other) => Err(AuthError::configuration(name, display_value(other))),
        None => Err(AuthError::configuration(name, "")),
    }
}

/// An optional string field; present but mistyped values still fail.
pub(crate) fn optional_string(
    config: &ConfigMap,
    name: &str,
    env_var: Option<&str>,
) -> Result<Option<String>, AuthError> {
    if let Some(value) = env_var.and_then(env_value) {
        return Ok(Some(value));
    }
    match config.get(name) {
        Some(serde_json::Value::String(value)) if !value.is_empty() => Ok(Some(value.clone())),
        Some(serde_json::Value::String(_)) | None => Ok(None),
        Some(other) => Err(AuthError::configuration(name, display_value(other))),
    }
}

/// An optional bool field with a default.
pub(crate) fn optional_bool(
    config: &ConfigMap,
    name: &str,
    default: bool,
) -> Result<bool, AuthError> {
    match config.get(name) {
        None => Ok(default),
        Some(serde_json::Value::Bool(value)) => Ok(*value),
        Some(other) => Err(AuthError::configuration(name, display_value(other))),
    }
}

/// Free-form `properties` map merged into the token request form body.
/// Sorted so downstream cache keys are deterministic.
pub(crate) fn properties(config: &ConfigMap) -> Result<BTreeMap<String, String>, AuthError> {
    let mut result = BTreeMap::new();
    let Some(value) = config.get("properties") else {
        return Ok(result);
    };
    let serde_json::Value::Object(map) = value else {
        return Err(AuthError::configuration("properties", display_value(value)));
    };
    for (key, value) in map {
        match value {
            serde_json::Value::String(value) => {
                result.insert(key.clone(), value.clone());
            }
            other => return Err(AuthError::configuration(key, display_value(other))),
        }
    }
    Ok(result)
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::AuthenticatorRequest;
    use serde_json::json;

    fn config_map(value: serde_json::Value) -> ConfigMap {
        value.as_object().expect("object").clone()
    }

    fn context_with(config: serde_json::Value) -> AuthenticatorContext {
        AuthenticatorContext::new(
            "credentials",
            config_map(config),
            None,
            "op-1",
            false,
            false,
            AuthenticatorRequest::new("https://cloud.uipath.com/my-org/my-tenant/users"),
        )
    }

    #[test]
    fn required_string_reads_config_value() {
        let config = config_map(json!({"clientId": "my-client-id"}));
        assert_eq!(
            required_string(&config, "clientId", None).unwrap(),
            "my-client-id"
        );
    }

    #[test]
    fn required_string_rejects_wrong_type() {
        let config = config_map(json!({"clientId": 1}));
        let err = required_string(&config, "clientId", None).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for clientId: '1'");
    }

    #[test]
    fn required_string_rejects_missing_value() {
        let config = ConfigMap::new();
        let err = required_string(&config, "clientId", None).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { field, .. } if field == "clientId"));
    }

    #[test]
    fn optional_string_missing_is_none() {
        let config = ConfigMap::new();
        assert_eq!(optional_string(&config, "clientSecret", None).unwrap(), None);
    }

    #[test]
    fn optional_bool_default_and_override() {
        let config = ConfigMap::new();
        assert!(optional_bool(&config, "offlineAccess", true).unwrap());

        let config = config_map(json!({"offlineAccess": false}));
        assert!(!optional_bool(&config, "offlineAccess", true).unwrap());

        let config = config_map(json!({"offlineAccess": "yes"}));
        assert!(optional_bool(&config, "offlineAccess", true).is_err());
    }

    #[test]
    fn properties_require_string_values() {
        let config = config_map(json!({"properties": {"acr_values": "tenant:my-tenant"}}));
        let props = properties(&config).unwrap();
        assert_eq!(props.get("acr_values").map(String::as_str), Some("tenant:my-tenant"));

        let config = config_map(json!({"properties": {"count": 3}}));
        assert!(properties(&config).is_err());

        let config = config_map(json!({"properties": "not-a-map"}));
        assert!(properties(&config).is_err());
    }

    #[test]
    fn bearer_config_parses_and_defaults_grant_type() {
        let ctx = context_with(json!({
            "clientId": "my-client-id",
            "clientSecret": "my-client-secret"
        }));
        let config = BearerConfig::from_context(&ctx).expect("valid config");
        assert_eq!(config.grant_type, "client_credentials");
        assert_eq!(config.client_id, "my-client-id");
        assert_eq!(config.client_secret, "my-client-secret");
        assert_eq!(
            config.identity_uri.as_str(),
            "https://cloud.uipath.com/identity_"
        );
    }

    #[test]
    fn bearer_config_rejects_mistyped_client_id() {
        let ctx = context_with(json!({"clientId": 1, "clientSecret": "secret"}));
        let err = BearerConfig::from_context(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for clientId: '1'");
    }

    #[test]
    fn oauth_config_appends_offline_access_scope() {
        let ctx = context_with(json!({
            "clientId": "my-client-id",
            "redirectUri": "http://localhost:12700",
            "scopes": "OR.Users"
        }));
        let config = OAuthConfig::from_context(&ctx).expect("valid config");
        assert_eq!(config.scopes, "OR.Users offline_access");
        assert!(config.offline_access);
        assert_eq!(config.redirect_uri.port(), Some(12700));
    }

    #[test]
    fn oauth_config_without_offline_access_keeps_scopes() {
        let ctx = context_with(json!({
            "clientId": "my-client-id",
            "redirectUri": "http://localhost:12700",
            "scopes": "OR.Users",
            "offlineAccess": false
        }));
        let config = OAuthConfig::from_context(&ctx).expect("valid config");
        assert_eq!(config.scopes, "OR.Users");
    }

    #[test]
    fn oauth_config_rejects_invalid_redirect_uri() {
        let ctx = context_with(json!({
            "clientId": "my-client-id",
            "redirectUri": "::not-a-url::",
            "scopes": "OR.Users"
        }));
        let err = OAuthConfig::from_context(&ctx).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { field, .. } if field == "redirectUri"));
    }

    #[test]
    fn identity_uri_prefers_explicit_configuration() {
        let mut ctx = context_with(json!({}));
        ctx.identity_uri = Some(Url::parse("https://identity.example.com/id").unwrap());
        let uri = resolve_identity_uri(&ctx).unwrap();
        assert_eq!(uri.as_str(), "https://identity.example.com/id");
    }

    #[test]
    fn identity_uri_derivation_preserves_port() {
        let mut ctx = context_with(json!({}));
        ctx.request = AuthenticatorRequest::new("http://localhost:8080/my-service");
        let uri = resolve_identity_uri(&ctx).unwrap();
        assert_eq!(uri.as_str(), "http://localhost:8080/identity_");
    }
}
