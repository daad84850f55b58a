//! auth::bearer
//!
//! Client-credentials strategy for service-to-service scenarios.
//!
//! Applies when the profile (or the `UIPATH_CLIENT_ID` and
//! `UIPATH_CLIENT_SECRET` environment variables) carries a confidential
//! client id and secret and no redirect URI. The confidential pair is
//! exchanged at the identity service for a bearer token; the token cache
//! makes repeated invocations cheap.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::Cache;

use super::config::{
    value_set, BearerConfig, CLIENT_ID_ENV_VAR, CLIENT_SECRET_ENV_VAR, REDIRECT_URI_ENV_VAR,
};
use super::context::AuthenticatorContext;
use super::errors::AuthError;
use super::identity::{IdentityClient, TokenGrant, TokenRequest};
use super::{AuthToken, Authenticator};

pub struct BearerAuthenticator {
    cache: Arc<dyn Cache>,
}

impl BearerAuthenticator {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    fn enabled(ctx: &AuthenticatorContext) -> bool {
        value_set(&ctx.config, "clientId", CLIENT_ID_ENV_VAR)
            && value_set(&ctx.config, "clientSecret", CLIENT_SECRET_ENV_VAR)
            && !value_set(&ctx.config, "redirectUri", REDIRECT_URI_ENV_VAR)
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    fn name(&self) -> &str {
        "bearer"
    }

    async fn authenticate(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError> {
        if !Self::enabled(ctx) {
            return Ok(None);
        }
        let config = BearerConfig::from_context(ctx)?;
        let request = TokenRequest {
            base_uri: config.identity_uri,
            grant: TokenGrant::ClientCredentials {
                grant_type: config.grant_type,
                client_id: config.client_id,
                client_secret: config.client_secret,
            },
            scopes: config.scopes,
            properties: config.properties,
            operation_id: ctx.operation_id.clone(),
            insecure: ctx.insecure,
        };
        let client = IdentityClient::new(self.cache.clone(), ctx.debug);
        let result = client.get_token(&request).await?;
        let token = AuthToken::bearer(result.access_token);
        ctx.set_authorization(&token.authorization());
        Ok(Some(token))
    }
}
