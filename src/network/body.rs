//! network::body
//!
//! Replay-bounded request bodies.
//!
//! Retrying a request requires resending the exact bytes of the original
//! attempt, but the original source (e.g. a file stream) is generally not
//! re-readable. Bodies are therefore buffered up to [`BODY_BUFFER_LIMIT`];
//! anything larger is handed to the transport as a single-shot payload that
//! is sent at most once, and a retry of it is abandoned.

use std::io::Read;
use std::sync::Mutex;

/// Upper bound on the bytes buffered for replay (10 MiB).
pub const BODY_BUFFER_LIMIT: usize = 10 * 1024 * 1024;

/// A request body that knows whether it can be replayed on retry.
#[derive(Debug)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// Fully buffered body; every attempt sends an identical copy.
    Buffered(Vec<u8>),
    /// Body beyond the replay limit; consumed by the first attempt only.
    SingleShot(Mutex<Option<Vec<u8>>>),
}

impl RequestBody {
    pub fn empty() -> Self {
        RequestBody::Empty
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        RequestBody::Buffered(bytes.into())
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        RequestBody::Buffered(text.into().into_bytes())
    }

    /// Drain a reader into a body, buffering at most [`BODY_BUFFER_LIMIT`]
    /// bytes for replay. Larger payloads become [`RequestBody::SingleShot`].
    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        if data.len() <= BODY_BUFFER_LIMIT {
            Ok(RequestBody::Buffered(data))
        } else {
            Ok(RequestBody::SingleShot(Mutex::new(Some(data))))
        }
    }

    /// Whether a retry can resend this body.
    pub fn is_replayable(&self) -> bool {
        !matches!(self, RequestBody::SingleShot(_))
    }

    /// The bytes for the next attempt, or `None` when a single-shot body
    /// has already been consumed.
    pub(crate) fn next_attempt(&self) -> Option<Vec<u8>> {
        match self {
            RequestBody::Empty => Some(Vec::new()),
            RequestBody::Buffered(bytes) => Some(bytes.clone()),
            RequestBody::SingleShot(slot) => slot.lock().ok()?.take(),
        }
    }

    /// A copy of the buffered bytes for logging. Single-shot payloads are
    /// not mirrored.
    pub(crate) fn logged_bytes(&self) -> &[u8] {
        match self {
            RequestBody::Buffered(bytes) => bytes,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_body_replays_identical_bytes() {
        let body = RequestBody::from_text("payload");
        let first = body.next_attempt().expect("first attempt");
        let second = body.next_attempt().expect("second attempt");
        assert_eq!(first, second);
        assert_eq!(first, b"payload");
        assert!(body.is_replayable());
    }

    #[test]
    fn empty_body_is_replayable() {
        let body = RequestBody::empty();
        assert!(body.is_replayable());
        assert_eq!(body.next_attempt(), Some(Vec::new()));
    }

    #[test]
    fn reader_within_limit_is_buffered() {
        let data = vec![7u8; 1024];
        let body = RequestBody::from_reader(&data[..]).expect("read");
        assert!(body.is_replayable());
        assert_eq!(body.next_attempt(), Some(data));
    }

    #[test]
    fn reader_beyond_limit_is_single_shot() {
        let data = vec![1u8; BODY_BUFFER_LIMIT + 1];
        let body = RequestBody::from_reader(&data[..]).expect("read");
        assert!(!body.is_replayable());

        let first = body.next_attempt().expect("first attempt");
        assert_eq!(first.len(), BODY_BUFFER_LIMIT + 1);
        // A retry finds nothing left to send.
        assert!(body.next_attempt().is_none());
    }
}
