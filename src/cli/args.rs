//! cli::args
//!
//! Command-line argument definitions using clap derive.

use clap::{Args, Parser, Subcommand};
use url::Url;

/// UiPath command-line interface
#[derive(Parser, Debug)]
#[command(name = "uipath")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Mirror HTTP traffic to standard error
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authenticate with the UiPath platform
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Acquire a bearer token and print it
    #[command(
        long_about = "Acquire a bearer token and print it.\n\n\
            Strategies are tried in order: client credentials, personal \
            access token, static token, interactive OAuth login, then any \
            configured external authenticators. Values can come from flags \
            or from the UIPATH_* environment variables."
    )]
    Token(AuthArgs),

    /// Perform an interactive browser login
    Login(AuthArgs),
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// URL of the request the token is for
    #[arg(long)]
    pub url: Url,

    /// Identity-service base URI; derived from --url when omitted
    #[arg(long)]
    pub identity_uri: Option<Url>,

    /// Confidential client id (or UIPATH_CLIENT_ID)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Confidential client secret (or UIPATH_CLIENT_SECRET)
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Personal access token (or UIPATH_PAT)
    #[arg(long)]
    pub pat: Option<String>,

    /// Pre-issued static bearer token
    #[arg(long)]
    pub token: Option<String>,

    /// Token grant type; defaults to client_credentials
    #[arg(long)]
    pub grant_type: Option<String>,

    /// Space-separated OAuth scopes
    #[arg(long)]
    pub scopes: Option<String>,

    /// Loopback redirect URI for the interactive login
    #[arg(long)]
    pub redirect_uri: Option<String>,

    /// Extra token-request form property, as key=value; repeatable
    #[arg(long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// External authenticator, as name=path; repeatable
    #[arg(long = "authenticator", value_name = "NAME=PATH")]
    pub authenticators: Vec<String>,
}
