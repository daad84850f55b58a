//! cli
//!
//! Command-line interface layer.
//!
//! The CLI layer is thin: it parses arguments via clap and dispatches to
//! the command handlers, which drive [`crate::auth`]. No credential
//! logic lives here.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;

use args::{AuthCommand, Command};

/// Run the CLI application. Main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Auth { command } => match command {
            AuthCommand::Token(args) => commands::token(&args, cli.debug, cli.insecure).await,
            AuthCommand::Login(args) => commands::login(&args, cli.debug, cli.insecure).await,
        },
    }
}
