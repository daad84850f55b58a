//! auth::token
//!
//! Static bearer-token strategy for profiles that carry a pre-issued
//! `token` value verbatim.

use async_trait::async_trait;

use super::config::optional_string;
use super::context::AuthenticatorContext;
use super::errors::AuthError;
use super::{AuthToken, Authenticator};

#[derive(Debug, Default)]
pub struct TokenAuthenticator;

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    fn name(&self) -> &str {
        "token"
    }

    async fn authenticate(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError> {
        let Some(value) = optional_string(&ctx.config, "token", None)? else {
            return Ok(None);
        };
        let token = AuthToken::bearer(value);
        ctx.set_authorization(&token.authorization());
        Ok(Some(token))
    }
}
