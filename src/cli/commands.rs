//! cli::commands
//!
//! Command handlers. Handlers translate parsed arguments into an
//! authenticator context, run the chain, and format output; all
//! credential logic lives in [`crate::auth`].

use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};

use crate::auth::{
    AuthToken, AuthenticatorChain, AuthenticatorContext, AuthenticatorRequest, ConfigMap,
    ExecBrowserLauncher, ExternalConfig,
};
use crate::cache::FileCache;

use super::args::AuthArgs;

/// `uipath auth token`: run the chain and print the raw token text.
pub async fn token(args: &AuthArgs, debug: bool, insecure: bool) -> Result<()> {
    let token = authenticate(args, debug, insecure)
        .await?
        .ok_or_else(|| anyhow!("No authenticator produced a token; provide credentials via flags or UIPATH_* environment variables"))?;
    println!("{}", token.value);
    Ok(())
}

/// `uipath auth login`: force an interactive login profile and confirm.
pub async fn login(args: &AuthArgs, debug: bool, insecure: bool) -> Result<()> {
    if args.redirect_uri.is_none() {
        bail!("The login command requires --redirect-uri");
    }
    authenticate(args, debug, insecure)
        .await?
        .ok_or_else(|| anyhow!("Login did not produce a token"))?;
    eprintln!("Successfully logged in");
    Ok(())
}

async fn authenticate(args: &AuthArgs, debug: bool, insecure: bool) -> Result<Option<AuthToken>> {
    let config = build_config(args)?;
    let externals = parse_externals(&args.authenticators)?;
    let mut ctx = AuthenticatorContext::new(
        "credentials",
        config,
        args.identity_uri.clone(),
        uuid::Uuid::new_v4().to_string(),
        insecure,
        debug,
        AuthenticatorRequest::new(args.url.as_str()),
    );

    let chain = AuthenticatorChain::standard(
        Arc::new(FileCache::new()),
        Arc::new(ExecBrowserLauncher::new()),
        externals,
    );
    chain.run(&mut ctx).await.context("Authentication failed")
}

fn build_config(args: &AuthArgs) -> Result<ConfigMap> {
    let mut config = ConfigMap::new();
    let mut set = |name: &str, value: &Option<String>| {
        if let Some(value) = value {
            config.insert(name.to_string(), serde_json::Value::String(value.clone()));
        }
    };
    set("clientId", &args.client_id);
    set("clientSecret", &args.client_secret);
    set("pat", &args.pat);
    set("token", &args.token);
    set("grantType", &args.grant_type);
    set("scopes", &args.scopes);
    set("redirectUri", &args.redirect_uri);

    if !args.properties.is_empty() {
        let mut properties = ConfigMap::new();
        for pair in &args.properties {
            let (key, value) = split_pair(pair)
                .with_context(|| format!("Invalid --property '{}', expected KEY=VALUE", pair))?;
            properties.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        }
        config.insert(
            "properties".to_string(),
            serde_json::Value::Object(properties),
        );
    }
    Ok(config)
}

fn parse_externals(specs: &[String]) -> Result<Vec<ExternalConfig>> {
    specs
        .iter()
        .map(|spec| {
            let (name, path) = split_pair(spec)
                .with_context(|| format!("Invalid --authenticator '{}', expected NAME=PATH", spec))?;
            Ok(ExternalConfig::new(name, path))
        })
        .collect()
}

fn split_pair(spec: &str) -> Result<(&str, &str)> {
    match spec.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok((key, value)),
        _ => bail!("missing '=' separator"),
    }
}
