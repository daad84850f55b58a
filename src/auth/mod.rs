//! auth
//!
//! Authentication for outbound platform requests.
//!
//! # Design
//!
//! Every command request passes through an [`AuthenticatorChain`] of
//! strategies. Each strategy inspects the shared
//! [`AuthenticatorContext`], decides whether it applies, and on success
//! mutates the request header map (and surfaces an [`AuthToken`] for
//! callers that need the raw token text). Strategies:
//!
//! - [`BearerAuthenticator`]: confidential client-credentials exchange
//! - [`PatAuthenticator`]: personal access token from config or env
//! - [`TokenAuthenticator`]: pre-issued static bearer token
//! - [`OAuthAuthenticator`]: interactive browser login with PKCE
//! - [`ExternalAuthenticator`]: delegation to a user-supplied subprocess
//!
//! Issued tokens are cached on disk (see [`crate::cache`]) so repeated
//! CLI invocations reuse them until shortly before expiry.

mod bearer;
mod browser;
mod callback;
mod chain;
mod config;
mod context;
mod errors;
mod external;
mod html;
mod identity;
mod oauth;
mod pat;
mod secret;
mod token;

use async_trait::async_trait;

pub use bearer::BearerAuthenticator;
pub use browser::{BrowserLauncher, ExecBrowserLauncher};
pub use callback::{CallbackServer, MISSING_CODE_ERROR, STATE_MISMATCH_ERROR};
pub use chain::AuthenticatorChain;
pub use config::{BearerConfig, ExternalConfig, OAuthConfig};
pub use context::{AuthToken, AuthenticatorContext, AuthenticatorRequest, ConfigMap};
pub use errors::AuthError;
pub use external::ExternalAuthenticator;
pub use identity::{IdentityClient, TokenGrant, TokenRequest, TokenResult};
pub use oauth::{OAuthAuthenticator, LOGIN_EXPIRED_ERROR};
pub use pat::PatAuthenticator;
pub use secret::{PkcePair, SecretGenerator};
pub use token::TokenAuthenticator;

/// One authentication strategy.
///
/// A strategy that does not apply to the given context returns
/// `Ok(None)` and leaves the context untouched.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Short name used in log and error messages.
    fn name(&self) -> &str;

    async fn authenticate(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError>;
}
