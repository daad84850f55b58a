//! auth::oauth
//!
//! Interactive authorization-code login with PKCE.
//!
//! # Design
//!
//! The strategy applies when the profile carries a `clientId`,
//! `redirectUri`, and `scopes`. It tries, in order: a cached access
//! token, a cached refresh token (when `offline_access` is on), and
//! finally a full browser login. The login races the loopback redirect
//! against an overall deadline; whichever completes first wins and the
//! other is dropped. The authorization URL is always printed so a login
//! can be completed manually when no browser opens.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::cache::Cache;

use super::browser::BrowserLauncher;
use super::callback::CallbackServer;
use super::config::{
    value_set, OAuthConfig, CLIENT_ID_ENV_VAR, REDIRECT_URI_ENV_VAR, SCOPES_ENV_VAR,
};
use super::context::AuthenticatorContext;
use super::errors::AuthError;
use super::identity::{
    authorize_endpoint, oauth_access_token_cache_key, oauth_refresh_token_cache_key,
    IdentityClient, TokenGrant, TokenRequest, TOKEN_EXPIRY_MARGIN_SECS,
};
use super::secret::SecretGenerator;
use super::{AuthToken, Authenticator};

pub const LOGIN_EXPIRED_ERROR: &str = "OAuth Login expired";

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Identity-service refresh tokens do not report their own lifetime;
/// seven days matches the service-side sliding expiration.
const REFRESH_TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

pub struct OAuthAuthenticator {
    cache: Arc<dyn Cache>,
    browser: Arc<dyn BrowserLauncher>,
    secret_generator: SecretGenerator,
    login_timeout: Duration,
}

impl OAuthAuthenticator {
    pub fn new(cache: Arc<dyn Cache>, browser: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            cache,
            browser,
            secret_generator: SecretGenerator::new(),
            login_timeout: LOGIN_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    fn enabled(ctx: &AuthenticatorContext) -> bool {
        value_set(&ctx.config, "clientId", CLIENT_ID_ENV_VAR)
            && value_set(&ctx.config, "redirectUri", REDIRECT_URI_ENV_VAR)
            && value_set(&ctx.config, "scopes", SCOPES_ENV_VAR)
    }

    /// Mints a fresh access token from a cached refresh token, if one is
    /// available. A failed refresh falls back to the interactive login
    /// rather than failing the command.
    async fn try_refresh(
        &self,
        ctx: &AuthenticatorContext,
        config: &OAuthConfig,
    ) -> Option<String> {
        let refresh_key =
            oauth_refresh_token_cache_key(&config.identity_uri, &config.client_id, &config.scopes);
        let (refresh_token, _) = self.cache.get(&refresh_key)?;
        let request = TokenRequest {
            base_uri: config.identity_uri.clone(),
            grant: TokenGrant::RefreshToken {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                refresh_token,
            },
            scopes: config.scopes.clone(),
            properties: Default::default(),
            operation_id: ctx.operation_id.clone(),
            insecure: ctx.insecure,
        };
        let client = IdentityClient::new(self.cache.clone(), ctx.debug);
        match client.get_token(&request).await {
            Ok(result) => {
                self.store_refresh_token(config, result.refresh_token.as_deref());
                Some(result.access_token)
            }
            Err(_) => None,
        }
    }

    async fn login(
        &self,
        ctx: &AuthenticatorContext,
        config: &OAuthConfig,
    ) -> Result<String, AuthError> {
        let server = CallbackServer::bind(&config.redirect_uri).await?;
        let redirect_url = server.redirect_url().clone();
        let pkce = self.secret_generator.generate_pkce();
        let state = self.secret_generator.generate_state();

        let authorize_url = authorize_endpoint(
            &config.identity_uri,
            &[
                ("response_type", "code"),
                ("client_id", &config.client_id),
                ("redirect_uri", redirect_url.as_str()),
                ("scope", &config.scopes),
                ("code_challenge", &pkce.code_challenge),
                ("code_challenge_method", "S256"),
                ("state", &state),
            ],
        )?;
        eprintln!("Go to URL and perform login:\n{}", authorize_url);

        let browser = self.browser.clone();
        let browser_url = authorize_url.clone();
        // Best effort; the printed URL covers hosts without a browser.
        tokio::spawn(async move {
            let _ = browser.open(browser_url).await;
        });

        let exchange = async {
            let code = server.wait_for_code(&state).await?;
            self.exchange_code(ctx, config, code, pkce.code_verifier.clone(), &redirect_url)
                .await
        };
        match tokio::time::timeout(self.login_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(LOGIN_EXPIRED_ERROR.to_string())),
        }
    }

    async fn exchange_code(
        &self,
        ctx: &AuthenticatorContext,
        config: &OAuthConfig,
        code: String,
        code_verifier: String,
        redirect_url: &Url,
    ) -> Result<String, AuthError> {
        let request = TokenRequest {
            base_uri: config.identity_uri.clone(),
            grant: TokenGrant::AuthorizationCode {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                code,
                code_verifier,
                redirect_uri: redirect_url.to_string(),
            },
            scopes: config.scopes.clone(),
            properties: Default::default(),
            operation_id: ctx.operation_id.clone(),
            insecure: ctx.insecure,
        };
        let client = IdentityClient::new(self.cache.clone(), ctx.debug);
        let result = client.get_token(&request).await?;
        self.store_refresh_token(config, result.refresh_token.as_deref());
        Ok(result.access_token)
    }

    fn store_refresh_token(&self, config: &OAuthConfig, refresh_token: Option<&str>) {
        let Some(refresh_token) = refresh_token else {
            return;
        };
        let key =
            oauth_refresh_token_cache_key(&config.identity_uri, &config.client_id, &config.scopes);
        self.cache.set(
            &key,
            refresh_token,
            REFRESH_TOKEN_EXPIRY_SECS - TOKEN_EXPIRY_MARGIN_SECS,
        );
    }
}

#[async_trait]
impl Authenticator for OAuthAuthenticator {
    fn name(&self) -> &str {
        "oauth"
    }

    async fn authenticate(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError> {
        if !Self::enabled(ctx) {
            return Ok(None);
        }
        let config = OAuthConfig::from_context(ctx)?;

        let access_key =
            oauth_access_token_cache_key(&config.identity_uri, &config.client_id, &config.scopes);
        let access_token = if let Some((cached, _)) = self.cache.get(&access_key) {
            cached
        } else if let Some(refreshed) = self.try_refresh(ctx, &config).await {
            refreshed
        } else {
            self.login(ctx, &config).await?
        };

        let token = AuthToken::bearer(access_token);
        ctx.set_authorization(&token.authorization());
        Ok(Some(token))
    }
}
