//! auth::chain
//!
//! Runs the registered strategies in a fixed order against one shared
//! context. Strategies that do not apply pass through untouched; the
//! first error short-circuits the run; when several strategies produce a
//! token, the last one wins.

use std::sync::Arc;

use crate::cache::Cache;

use super::bearer::BearerAuthenticator;
use super::browser::BrowserLauncher;
use super::config::ExternalConfig;
use super::context::AuthenticatorContext;
use super::errors::AuthError;
use super::external::ExternalAuthenticator;
use super::oauth::OAuthAuthenticator;
use super::pat::PatAuthenticator;
use super::token::TokenAuthenticator;
use super::{AuthToken, Authenticator};

pub struct AuthenticatorChain {
    authenticators: Vec<Box<dyn Authenticator>>,
}

impl AuthenticatorChain {
    pub fn new(authenticators: Vec<Box<dyn Authenticator>>) -> Self {
        Self { authenticators }
    }

    /// The standard strategy order. External authenticators run last so
    /// they can observe (and override) headers set by built-in ones.
    pub fn standard(
        cache: Arc<dyn Cache>,
        browser: Arc<dyn BrowserLauncher>,
        externals: Vec<ExternalConfig>,
    ) -> Self {
        let mut authenticators: Vec<Box<dyn Authenticator>> = vec![
            Box::new(BearerAuthenticator::new(cache.clone())),
            Box::new(PatAuthenticator::new()),
            Box::new(TokenAuthenticator::new()),
            Box::new(OAuthAuthenticator::new(cache, browser)),
        ];
        for config in externals {
            authenticators.push(Box::new(ExternalAuthenticator::new(config)));
        }
        Self::new(authenticators)
    }

    pub async fn run(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError> {
        let mut last_token = None;
        for authenticator in &self.authenticators {
            if let Some(token) = authenticator.authenticate(ctx).await? {
                last_token = Some(token);
            }
        }
        Ok(last_token)
    }
}
