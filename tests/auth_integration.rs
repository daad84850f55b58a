//! End-to-end tests for the authenticator chain against a fake identity
//! service, with the real file-backed token cache.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uipathcli::auth::{
    AuthError, AuthenticatorChain, AuthenticatorContext, AuthenticatorRequest, BrowserLauncher,
    ConfigMap,
};
use uipathcli::cache::FileCache;

fn context(config: serde_json::Value, request_url: &str) -> AuthenticatorContext {
    AuthenticatorContext::new(
        "credentials",
        config.as_object().cloned().unwrap_or_default(),
        None,
        "op-1",
        false,
        false,
        AuthenticatorRequest::new(request_url),
    )
}

/// A browser that must never be opened by the scenario under test.
struct UnusedBrowser;

#[async_trait]
impl BrowserLauncher for UnusedBrowser {
    async fn open(&self, url: Url) -> Result<(), AuthError> {
        panic!("unexpected browser launch for {}", url);
    }
}

/// Plays the user's part in the interactive login: follows the
/// authorization URL's `redirect_uri` back with a fixed code.
struct RedirectingBrowser;

#[async_trait]
impl BrowserLauncher for RedirectingBrowser {
    async fn open(&self, url: Url) -> Result<(), AuthError> {
        let mut redirect_uri = None;
        let mut state = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "redirect_uri" => redirect_uri = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }
        let mut redirect = Url::parse(&redirect_uri.expect("redirect_uri")).unwrap();
        redirect.set_query(Some(&format!(
            "code=my-authorization-code&state={}",
            state.expect("state")
        )));
        reqwest::get(redirect)
            .await
            .map_err(|err| AuthError::Internal(format!("redirect failed: {}", err)))?;
        Ok(())
    }
}

fn chain_with(cache_dir: &std::path::Path, browser: Arc<dyn BrowserLauncher>) -> AuthenticatorChain {
    AuthenticatorChain::standard(
        Arc::new(FileCache::with_directory(cache_dir.to_path_buf())),
        browser,
        Vec::new(),
    )
}

#[tokio::test]
async fn client_credentials_token_is_fetched_once_across_invocations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity_/connect/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "my-access-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let config = json!({
        "clientId": "my-client-id",
        "clientSecret": "my-client-secret",
        "scopes": "OR.Users"
    });
    let request_url = format!("{}/my-org/my-tenant/users", server.uri());

    // Two independent chain runs share only the on-disk cache.
    for _ in 0..2 {
        let chain = chain_with(cache_dir.path(), Arc::new(UnusedBrowser));
        let mut ctx = context(config.clone(), &request_url);
        let token = chain.run(&mut ctx).await.expect("chain run");
        assert_eq!(token.expect("token").value, "my-access-token");
        assert_eq!(
            ctx.request.header.get("Authorization").map(String::as_str),
            Some("Bearer my-access-token")
        );
    }
}

#[tokio::test]
async fn later_strategy_overrides_earlier_token() {
    let cache_dir = tempfile::tempdir().unwrap();
    let chain = chain_with(cache_dir.path(), Arc::new(UnusedBrowser));
    // Both the PAT and the static token strategy apply; the static token
    // strategy runs later and wins.
    let mut ctx = context(
        json!({"pat": "my-personal-access-token", "token": "my-static-token"}),
        "https://cloud.uipath.com/my-org/my-tenant/users",
    );
    let token = chain.run(&mut ctx).await.expect("chain run");
    assert_eq!(token.expect("token").value, "my-static-token");
    assert_eq!(
        ctx.request.header.get("Authorization").map(String::as_str),
        Some("Bearer my-static-token")
    );
}

#[tokio::test]
async fn no_applicable_strategy_leaves_request_untouched() {
    let cache_dir = tempfile::tempdir().unwrap();
    let chain = chain_with(cache_dir.path(), Arc::new(UnusedBrowser));
    let mut ctx = context(
        json!({}),
        "https://cloud.uipath.com/my-org/my-tenant/users",
    );
    ctx.request
        .header
        .insert("X-Custom".to_string(), "preserved".to_string());

    let token = chain.run(&mut ctx).await.expect("chain run");
    assert!(token.is_none());
    assert_eq!(
        ctx.request.header.get("X-Custom").map(String::as_str),
        Some("preserved")
    );
    assert!(!ctx.request.header.contains_key("Authorization"));
}

#[tokio::test]
async fn interactive_login_flows_through_the_chain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity_/connect/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=my-authorization-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "my-login-token",
            "expires_in": 3600,
            "refresh_token": "my-refresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let config = json!({
        "clientId": "my-client-id",
        "redirectUri": "http://localhost:0/callback",
        "scopes": "OR.Users"
    });
    let request_url = format!("{}/my-org/my-tenant/users", server.uri());

    let chain = chain_with(cache_dir.path(), Arc::new(RedirectingBrowser));
    let mut ctx = context(config.clone(), &request_url);
    let token = chain.run(&mut ctx).await.expect("chain run");
    assert_eq!(token.expect("token").value, "my-login-token");

    // The second invocation reuses the cached access token; the token
    // endpoint still only saw one code exchange.
    let chain = chain_with(cache_dir.path(), Arc::new(UnusedBrowser));
    let mut ctx = context(config, &request_url);
    let token = chain.run(&mut ctx).await.expect("chain run");
    assert_eq!(token.expect("token").value, "my-login-token");
}

#[tokio::test]
async fn chain_surfaces_token_endpoint_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity_/connect/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let chain = chain_with(cache_dir.path(), Arc::new(UnusedBrowser));
    let mut ctx = context(
        json!({"clientId": "my-client-id", "clientSecret": "wrong-secret"}),
        &format!("{}/my-org/my-tenant/users", server.uri()),
    );
    let err = chain.run(&mut ctx).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "token service returned status code '400' and body 'invalid_client'"
    );
}

#[tokio::test]
async fn empty_config_map_roundtrips_through_json() {
    // The context is also the stdin wire format for external
    // authenticators; make sure an untouched context stays stable.
    let ctx = context(json!({}), "https://cloud.uipath.com/my-org/my-tenant/users");
    let serialized = serde_json::to_string(&ctx).expect("serialize");
    let parsed: AuthenticatorContext = serde_json::from_str(&serialized).expect("deserialize");
    assert_eq!(parsed.config, ConfigMap::new());
    assert_eq!(parsed.request.url, ctx.request.url);
}
