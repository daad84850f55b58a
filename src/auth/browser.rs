//! auth::browser
//!
//! Opens the system browser for the interactive login.
//!
//! The launcher is a trait so the interactive flow can be driven by a
//! fake in tests; the real implementation picks the platform opener at
//! runtime and bounds the wait on the opener process, since some openers
//! block for as long as the browser stays up.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::errors::AuthError;

const BROWSER_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self, url: Url) -> Result<(), AuthError>;
}

/// Launches the platform's URL opener as a child process.
#[derive(Debug, Default)]
pub struct ExecBrowserLauncher;

impl ExecBrowserLauncher {
    pub fn new() -> Self {
        Self
    }

    fn command(url: &Url) -> Option<tokio::process::Command> {
        let mut command = match std::env::consts::OS {
            "windows" => {
                let mut cmd = tokio::process::Command::new("rundll32");
                cmd.arg("url.dll,FileProtocolHandler");
                cmd
            }
            "macos" => tokio::process::Command::new("open"),
            "linux" => tokio::process::Command::new("xdg-open"),
            _ => return None,
        };
        command.arg(url.as_str());
        Some(command)
    }
}

#[async_trait]
impl BrowserLauncher for ExecBrowserLauncher {
    async fn open(&self, url: Url) -> Result<(), AuthError> {
        let Some(mut command) = Self::command(&url) else {
            return Err(AuthError::Internal(format!(
                "no browser launcher for platform '{}'",
                std::env::consts::OS
            )));
        };
        let mut child = command.spawn()?;
        match tokio::time::timeout(BROWSER_WAIT_TIMEOUT, child.wait()).await {
            Ok(status) => {
                let status = status?;
                if status.success() {
                    Ok(())
                } else {
                    Err(AuthError::Internal(format!(
                        "browser launcher exited with status {}",
                        status
                    )))
                }
            }
            Err(_) => Err(AuthError::Timeout(
                "Timed out waiting for browser to start".to_string(),
            )),
        }
    }
}
