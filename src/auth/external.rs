//! auth::external
//!
//! Delegation to a user-supplied authenticator executable.
//!
//! # Design
//!
//! This is the extension point for auth schemes the CLI does not build
//! in. The full [`AuthenticatorContext`] is serialized as JSON onto the
//! subprocess's standard input; the subprocess answers on standard output
//! with a JSON result carrying either an error string or a header map
//! (and optionally a token). Anything that goes wrong, from path
//! resolution to malformed output, surfaces as one wrapped error that
//! includes the captured standard error text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use super::config::ExternalConfig;
use super::context::AuthenticatorContext;
use super::errors::AuthError;
use super::{AuthToken, Authenticator};

/// Wire format of the subprocess's standard output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExternalResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_header: HashMap<String, String>,
    #[serde(default)]
    token: Option<AuthToken>,
}

pub struct ExternalAuthenticator {
    config: ExternalConfig,
}

impl ExternalAuthenticator {
    pub fn new(config: ExternalConfig) -> Self {
        Self { config }
    }

    /// Relative paths resolve against the directory of the CLI's own
    /// executable, so authenticator plugins can ship alongside it.
    fn resolve_path(&self) -> Result<PathBuf, AuthError> {
        let path = Path::new(&self.config.path);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        let exe = std::env::current_exe().map_err(|err| AuthError::Subprocess {
            name: self.config.name.clone(),
            message: format!("could not determine executable path: {}", err),
        })?;
        match exe.parent() {
            Some(dir) => Ok(dir.join(path)),
            None => Ok(path.to_path_buf()),
        }
    }

    fn subprocess_error(&self, message: impl Into<String>) -> AuthError {
        AuthError::Subprocess {
            name: self.config.name.clone(),
            message: message.into(),
        }
    }

    async fn run(&self, ctx: &AuthenticatorContext) -> Result<ExternalResult, AuthError> {
        let path = self.resolve_path()?;
        let input = serde_json::to_vec(ctx)
            .map_err(|err| self.subprocess_error(format!("could not serialize context: {}", err)))?;

        let mut child = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                self.subprocess_error(format!("could not run '{}': {}", path.display(), err))
            })?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&input)
                .await
                .map_err(|err| self.subprocess_error(format!("could not write input: {}", err)))?;
        }
        let output = child
            .wait_with_output()
            .await
            .map_err(|err| self.subprocess_error(format!("process failed: {}", err)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(self.subprocess_error(format!(
                "exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        serde_json::from_slice(&output.stdout).map_err(|err| {
            self.subprocess_error(format!("malformed output: {}: {}", err, stderr.trim()))
        })
    }
}

#[async_trait]
impl Authenticator for ExternalAuthenticator {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn authenticate(
        &self,
        ctx: &mut AuthenticatorContext,
    ) -> Result<Option<AuthToken>, AuthError> {
        let result = self.run(ctx).await?;
        if let Some(error) = result.error {
            if !error.is_empty() {
                return Err(self.subprocess_error(error));
            }
        }
        for (name, value) in result.request_header {
            ctx.request.header.insert(name, value);
        }
        Ok(result.token)
    }
}
