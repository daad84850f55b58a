//! auth::errors
//!
//! Error taxonomy for the authenticator chain.
//!
//! # Design
//!
//! Strategies never panic across the chain boundary; every failure is one
//! of these variants. The chain stops at the first error and the caller
//! surfaces it as the command's failure with no partial request sent.
//! Cache read/write failures are deliberately absent: caching is
//! best-effort and degrades to a miss.

use thiserror::Error;

use crate::network::TransportError;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A strategy's required config field is missing or has the wrong type.
    /// Never retried.
    #[error("invalid value for {field}: '{value}'")]
    Configuration { field: String, value: String },

    /// Connection-level failure talking to the identity or resource
    /// endpoint. Retried by the transport up to its attempt budget.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the token endpoint. Terminal immediately.
    #[error("token service returned status code '{status}' and body '{body}'")]
    Server { status: u16, body: String },

    /// Interactive login deadline or browser-start wait elapsed.
    #[error("{0}")]
    Timeout(String),

    /// OAuth state mismatch or missing authorization code. The message is
    /// also what the browser error page shows.
    #[error("{0}")]
    Validation(String),

    /// External authenticator failure: path resolution, process start,
    /// non-zero exit, or malformed JSON output. Includes captured stderr.
    #[error("external authenticator '{name}' failed: {message}")]
    Subprocess { name: String, message: String },

    /// Unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// Configuration error for a field whose value is missing or mistyped.
    pub fn configuration(field: impl Into<String>, value: impl ToString) -> Self {
        AuthError::Configuration {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Whether retrying the whole operation could help.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_))
    }
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(message) => AuthError::Network(message),
            TransportError::Server { status, body } => AuthError::Server { status, body },
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Internal(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_the_field() {
        let err = AuthError::configuration("clientId", 1);
        assert_eq!(err.to_string(), "invalid value for clientId: '1'");
    }

    #[test]
    fn server_error_carries_status_and_body() {
        let err = AuthError::Server {
            status: 400,
            body: "Invalid token request".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "token service returned status code '400' and body 'Invalid token request'"
        );
    }

    #[test]
    fn timeout_and_validation_display_verbatim() {
        assert_eq!(
            AuthError::Timeout("OAuth Login expired".into()).to_string(),
            "OAuth Login expired"
        );
        assert_eq!(
            AuthError::Validation(
                "The query string 'state' in the redirect_url did not match".into()
            )
            .to_string(),
            "The query string 'state' in the redirect_url did not match"
        );
    }

    #[test]
    fn transport_errors_map_into_auth_errors() {
        let err: AuthError = TransportError::Network("connection refused".into()).into();
        assert!(matches!(err, AuthError::Network(_)));
        assert!(err.is_transient());

        let err: AuthError = TransportError::Server {
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, AuthError::Server { status: 502, .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn subprocess_error_includes_name_and_stderr() {
        let err = AuthError::Subprocess {
            name: "kubernetes".into(),
            message: "exit status 1: no such cluster".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("kubernetes"));
        assert!(msg.contains("no such cluster"));
    }
}
