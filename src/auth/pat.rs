//! auth::pat
//!
//! Personal-access-token strategy. A PAT from profile config or the
//! `UIPATH_PAT` environment variable becomes the bearer credential
//! directly, with no network round trip.

use async_trait::async_trait;

use super::config::{optional_string, PAT_ENV_VAR};
use super::context::AuthenticatorContext;
use super::errors::AuthError;
use super::{AuthToken, Authenticator};

#[derive(Debug, Default)]
pub struct PatAuthenticator;

impl PatAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for PatAuthenticator {
    fn name(&self) -> &str {
        "pat"
    }

    async fn authenticate(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError> {
        let Some(pat) = optional_string(&ctx.config, "pat", Some(PAT_ENV_VAR))? else {
            return Ok(None);
        };
        let token = AuthToken::bearer(pat);
        ctx.set_authorization(&token.authorization());
        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::AuthenticatorRequest;
    use serde_json::json;

    fn context(config: serde_json::Value) -> AuthenticatorContext {
        AuthenticatorContext::new(
            "credentials",
            config.as_object().cloned().unwrap_or_default(),
            None,
            "op-1",
            false,
            false,
            AuthenticatorRequest::new("https://cloud.uipath.com/my-org/my-tenant/users"),
        )
    }

    #[tokio::test]
    async fn without_pat_is_a_no_op() {
        let mut ctx = context(json!({}));
        let result = PatAuthenticator::new().authenticate(&mut ctx).await.unwrap();
        assert!(result.is_none());
        assert!(ctx.request.header.is_empty());
    }

    #[tokio::test]
    async fn pat_from_config_sets_bearer_header() {
        let mut ctx = context(json!({"pat": "my-personal-access-token"}));
        let result = PatAuthenticator::new().authenticate(&mut ctx).await.unwrap();
        assert_eq!(result.unwrap().value, "my-personal-access-token");
        assert_eq!(
            ctx.request.header.get("Authorization").map(String::as_str),
            Some("Bearer my-personal-access-token")
        );
    }

    #[tokio::test]
    async fn mistyped_pat_fails_validation() {
        let mut ctx = context(json!({"pat": 7}));
        let err = PatAuthenticator::new()
            .authenticate(&mut ctx)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value for pat: '7'");
    }
}
