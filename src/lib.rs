//! uipathcli - Command-line interface for the UiPath cloud platform
//!
//! This crate implements the authentication core of the CLI: every outbound
//! call to the platform is handed a validated credential (typically a JWT
//! bearer token) and transported with bounded retries.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to auth)
//! - [`auth`] - Authenticator strategies, OAuth login flow, identity client
//! - [`cache`] - File-backed token cache shared across CLI invocations
//! - [`network`] - Resilient HTTP transport with replay-safe retries
//!
//! # Correctness Invariants
//!
//! The auth core maintains the following invariants:
//!
//! 1. Strategies never panic across the chain boundary; they return errors
//! 2. A cached token is never handed out within 30 seconds of real expiry
//! 3. Retried request bodies are byte-identical across attempts
//! 4. PKCE verifiers and CSRF state tokens come from a crypto-secure source

pub mod auth;
pub mod cache;
pub mod cli;
pub mod network;
