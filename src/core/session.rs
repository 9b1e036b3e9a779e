//! # Session Identity
//!
//! Every backend call made during one run of Evagent carries the same
//! session id so the agent can correlate the company profile, the invitee
//! list and the chat history.
//!
//! The id is generated once when the `App` is built and never changes.
//! It is not persisted: a new run is a new session.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

/// Opaque correlation token in the form `session-{unix_millis}-{random}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Length of the random suffix.
    const SUFFIX_LEN: usize = 9;

    pub fn generate() -> Self {
        Self(format!(
            "session-{}-{}",
            Utc::now().timestamp_millis(),
            base36_suffix(uuid::Uuid::new_v4().as_u128(), Self::SUFFIX_LEN)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Low `len` base36 digits of `value`, most significant first.
fn base36_suffix(mut value: u128, len: usize) -> String {
    let mut digits = vec![b'0'; len];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    digits.into_iter().map(char::from).collect()
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-run values every backend request needs.
///
/// Passed explicitly to the backend instead of living in a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub session_id: SessionId,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            session_id: SessionId::generate(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok(), "timestamp part: {}", parts[1]);
        assert_eq!(parts[2].len(), 9);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()),
            "suffix: {}",
            parts[2]
        );
    }

    #[test]
    fn test_base36_suffix_digits() {
        assert_eq!(base36_suffix(0, 9), "000000000");
        assert_eq!(base36_suffix(35, 3), "00z");
        assert_eq!(base36_suffix(36, 3), "010");
        // Only the low digits are kept
        assert_eq!(base36_suffix(36 * 36 * 36 + 1, 3), "001");
        assert_eq!(base36_suffix(u128::MAX, 9).len(), 9);
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id = SessionId("session-1-abc".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""session-1-abc""#);
    }

    #[test]
    fn test_request_context_clone_keeps_id() {
        let ctx = RequestContext::new();
        let cloned = ctx.clone();
        assert_eq!(ctx.session_id, cloned.session_id);
    }
}
