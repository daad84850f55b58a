//! auth::callback
//!
//! Loopback HTTP listener for the OAuth redirect.
//!
//! # Design
//!
//! The identity service redirects the browser back to a `localhost` URL
//! after login. This listener binds the port embedded in the configured
//! redirect URI (port 0 picks an ephemeral port, reported back through
//! the effective redirect URL), accepts the redirect GET, validates the
//! `code` and `state` query parameters, and answers the browser. A
//! successful redirect gets the branded logged-in page; a rejected one
//! gets the bare error message as the entire response body, the same
//! text the login then fails with.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use super::errors::AuthError;
use super::html::LOGGED_IN_PAGE_HTML;

pub const MISSING_CODE_ERROR: &str = "Could not find query string 'code' in redirect_url";
pub const STATE_MISMATCH_ERROR: &str = "The query string 'state' in the redirect_url did not match";

pub struct CallbackServer {
    listener: TcpListener,
    redirect_url: Url,
}

impl CallbackServer {
    /// Binds the host and port of the redirect URI. A zero port in the
    /// URI gets replaced by the actually bound ephemeral port.
    pub async fn bind(redirect_uri: &Url) -> Result<Self, AuthError> {
        let host = redirect_uri
            .host_str()
            .ok_or_else(|| AuthError::configuration("redirectUri", redirect_uri.as_str()))?;
        let port = redirect_uri.port_or_known_default().unwrap_or(0);
        let listener = TcpListener::bind((host, port)).await?;
        let mut redirect_url = redirect_uri.clone();
        let bound_port = listener.local_addr()?.port();
        redirect_url
            .set_port(Some(bound_port))
            .map_err(|_| AuthError::configuration("redirectUri", redirect_uri.as_str()))?;
        Ok(Self {
            listener,
            redirect_url,
        })
    }

    /// The redirect URL the identity service should send the browser to,
    /// with the ephemeral port filled in.
    pub fn redirect_url(&self) -> &Url {
        &self.redirect_url
    }

    /// Serves connections until the redirect for this login arrives, then
    /// returns the authorization code. Requests for other paths (browser
    /// favicon probes and the like) get a 404 and the wait continues.
    pub async fn wait_for_code(&self, expected_state: &str) -> Result<String, AuthError> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            if let Some(outcome) = self.handle_connection(stream, expected_state).await? {
                return outcome;
            }
        }
    }

    async fn handle_connection(
        &self,
        stream: TcpStream,
        expected_state: &str,
    ) -> Result<Option<Result<String, AuthError>>, AuthError> {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await? == 0 {
            return Ok(None);
        }
        let mut stream = reader.into_inner();

        let Some(target) = request_line.split_whitespace().nth(1) else {
            respond(&mut stream, 400, "Malformed request").await?;
            return Ok(None);
        };
        let Ok(request_url) = self.redirect_url.join(target) else {
            respond(&mut stream, 400, "Malformed request").await?;
            return Ok(None);
        };
        if request_url.path() != self.redirect_url.path() {
            respond(&mut stream, 404, "").await?;
            return Ok(None);
        }

        let mut code = None;
        let mut state = None;
        for (name, value) in request_url.query_pairs() {
            match name.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }

        // Error bodies carry the bare message and nothing else.
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            respond(&mut stream, 400, MISSING_CODE_ERROR).await?;
            return Ok(Some(Err(AuthError::Validation(
                MISSING_CODE_ERROR.to_string(),
            ))));
        };
        if state.as_deref() != Some(expected_state) {
            respond(&mut stream, 400, STATE_MISMATCH_ERROR).await?;
            return Ok(Some(Err(AuthError::Validation(
                STATE_MISMATCH_ERROR.to_string(),
            ))));
        }

        respond(&mut stream, 200, LOGGED_IN_PAGE_HTML).await?;
        Ok(Some(Ok(code)))
    }
}

async fn respond(stream: &mut TcpStream, status: u16, body: &str) -> Result<(), AuthError> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
