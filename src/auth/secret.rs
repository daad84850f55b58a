//! auth::secret
//!
//! PKCE and state secrets for the authorization-code flow.
//!
//! Secrets come from the OS CSPRNG via [`rand`], never from a
//! time-seeded generator: the code verifier and state value are the only
//! defense against authorization-code interception on the loopback
//! redirect.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SECRET_BYTES: usize = 32;

/// A PKCE verifier/challenge pair (RFC 7636, S256 method).
#[derive(Clone)]
pub struct PkcePair {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl std::fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkcePair")
            .field("code_verifier", &"**redacted**")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SecretGenerator;

impl SecretGenerator {
    pub fn new() -> Self {
        Self
    }

    /// A fresh verifier and its S256 challenge. The challenge hashes the
    /// base64url text of the verifier, not the raw bytes.
    pub fn generate_pkce(&self) -> PkcePair {
        let code_verifier = URL_SAFE_NO_PAD.encode(random_bytes());
        let digest = Sha256::digest(code_verifier.as_bytes());
        let code_challenge = URL_SAFE_NO_PAD.encode(digest);
        PkcePair {
            code_verifier,
            code_challenge,
        }
    }

    /// An opaque state value for CSRF protection on the redirect.
    pub fn generate_state(&self) -> String {
        URL_SAFE_NO_PAD.encode(random_bytes())
    }
}

fn random_bytes() -> [u8; SECRET_BYTES] {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_is_43_base64url_characters() {
        let pair = SecretGenerator::new().generate_pkce();
        assert_eq!(pair.code_verifier.len(), 43);
        assert!(pair
            .code_verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn challenge_is_s256_of_verifier_text() {
        let pair = SecretGenerator::new().generate_pkce();
        let digest = Sha256::digest(pair.code_verifier.as_bytes());
        assert_eq!(pair.code_challenge, URL_SAFE_NO_PAD.encode(digest));
    }

    #[test]
    fn successive_secrets_differ() {
        let generator = SecretGenerator::new();
        assert_ne!(
            generator.generate_pkce().code_verifier,
            generator.generate_pkce().code_verifier
        );
        assert_ne!(generator.generate_state(), generator.generate_state());
    }

    #[test]
    fn debug_output_redacts_verifier() {
        let pair = SecretGenerator::new().generate_pkce();
        let debug = format!("{:?}", pair);
        assert!(debug.contains("**redacted**"));
        assert!(!debug.contains(&pair.code_verifier));
    }
}
