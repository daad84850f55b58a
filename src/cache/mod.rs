//! cache - Token cache shared across CLI invocations
//!
//! The CLI is a short-lived process: without an external cache every command
//! would have to re-authenticate against the identity service. This module
//! persists acquired tokens on disk with TTL semantics so they can be reused
//! across invocations.
//!
//! # Design
//!
//! Caching is strictly best-effort. Read or write failures are treated as
//! cache misses and never surface to the caller; the worst case is a
//! redundant token fetch. The cache is shared across OS processes with no
//! locking. Concurrent writers to the same key race, but each write replaces
//! the whole file content, so a reader sees one complete entry or the other,
//! never a torn value.
//!
//! # Components
//!
//! - [`Cache`] - Trait for storing expiring values
//! - [`FileCache`] - File-per-key implementation under the user cache dir

mod file_cache;

pub use file_cache::FileCache;

/// Trait for storing temporary values with TTL semantics.
///
/// Used to persist bearer tokens and refresh tokens so they survive across
/// multiple CLI invocations.
pub trait Cache: Send + Sync {
    /// Look up a value by key.
    ///
    /// Returns the value and its expiry as unix epoch seconds, or `None`
    /// when the key is missing, unreadable, or expired.
    fn get(&self, key: &str) -> Option<(String, i64)>;

    /// Store a value under a key, expiring `expires_in` seconds from now.
    ///
    /// Values with a non-positive `expires_in` are not stored. Failures are
    /// swallowed; callers must not rely on the write having happened.
    fn set(&self, key: &str, value: &str, expires_in: i64);
}
