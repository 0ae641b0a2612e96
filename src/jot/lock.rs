//! Inline note locks.
//!
//! A locked note stores its access token in front of the body:
//!
//! ```text
//! <!-- LOCK:token -->
//! actual content...
//! ```
//!
//! There is no side metadata file; the marker is part of the stored bytes and
//! the token is kept in plaintext. A marker without its terminating ` -->\n`
//! yields an empty token, and [`required_token`] treats that as unlocked.

use crate::error::{JotError, Result};

pub const LOCK_PREFIX: &str = "<!-- LOCK:";
pub const LOCK_SUFFIX: &str = " -->\n";

/// Rejects tokens that would not read back unchanged from the marker: empty
/// ones, and ones that could end the marker early.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(JotError::Api("Lock token must not be empty".to_string()));
    }
    if token.contains(LOCK_SUFFIX.trim_end()) || token.contains('\n') {
        return Err(JotError::Api(
            "Lock token must not contain '-->' or line breaks".to_string(),
        ));
    }
    Ok(())
}

pub fn has_lock(content: &str) -> bool {
    content.starts_with(LOCK_PREFIX)
}

/// The token between the marker and ` -->\n`, or `""` when absent or malformed.
pub fn lock_token(content: &str) -> &str {
    if !has_lock(content) {
        return "";
    }
    match content.find(LOCK_SUFFIX) {
        Some(end) if end >= LOCK_PREFIX.len() => &content[LOCK_PREFIX.len()..end],
        _ => "",
    }
}

/// Content with the lock marker removed. Unlocked or malformed input is
/// returned unchanged.
pub fn strip_lock(content: &str) -> &str {
    if !has_lock(content) {
        return content;
    }
    match content.find(LOCK_SUFFIX) {
        Some(end) => &content[end + LOCK_SUFFIX.len()..],
        None => content,
    }
}

/// Locks `content` with `token`, replacing any existing lock. An empty token
/// removes the lock.
pub fn apply_lock(content: &str, token: &str) -> String {
    let body = strip_lock(content);
    if token.is_empty() {
        return body.to_string();
    }
    format!("{}{}{}{}", LOCK_PREFIX, token, LOCK_SUFFIX, body)
}

/// The token a caller must present to read `content`, if any.
pub fn required_token(content: &str) -> Option<&str> {
    match lock_token(content) {
        "" => None,
        token => Some(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_well_formed_lock() {
        let stored = "<!-- LOCK:secret -->\nHello";
        assert!(has_lock(stored));
        assert_eq!(lock_token(stored), "secret");
        assert_eq!(strip_lock(stored), "Hello");
        assert_eq!(required_token(stored), Some("secret"));
    }

    #[test]
    fn unlocked_content_passes_through() {
        let stored = "# Title\nbody";
        assert!(!has_lock(stored));
        assert_eq!(lock_token(stored), "");
        assert_eq!(strip_lock(stored), stored);
        assert_eq!(required_token(stored), None);
    }

    #[test]
    fn malformed_marker_degrades_to_unlocked() {
        let stored = "<!-- LOCK:dangling without end";
        assert!(has_lock(stored));
        assert_eq!(lock_token(stored), "");
        assert_eq!(strip_lock(stored), stored);
        assert_eq!(required_token(stored), None);
    }

    #[test]
    fn empty_token_marker_is_unlocked() {
        let stored = "<!-- LOCK: -->\nbody";
        assert_eq!(lock_token(stored), "");
        assert_eq!(required_token(stored), None);
        assert_eq!(strip_lock(stored), "body");
    }

    #[test]
    fn apply_lock_replaces_existing_token() {
        let locked = apply_lock("Hello", "one");
        assert_eq!(locked, "<!-- LOCK:one -->\nHello");
        let relocked = apply_lock(&locked, "two");
        assert_eq!(relocked, "<!-- LOCK:two -->\nHello");
        assert_eq!(strip_lock(&relocked), "Hello");
    }

    #[test]
    fn apply_empty_token_equals_strip() {
        for content in ["plain", "<!-- LOCK:t -->\nbody", "<!-- LOCK:broken", ""] {
            assert_eq!(apply_lock(content, ""), strip_lock(content));
        }
    }

    #[test]
    fn strip_after_apply_returns_body() {
        for content in ["", "x", "multi\nline\n", "<!-- not a lock -->\n"] {
            for token in ["t", "with space", "ünï"] {
                assert_eq!(strip_lock(&apply_lock(content, token)), content);
            }
        }
    }

    #[test]
    fn token_stops_at_first_terminator() {
        let stored = "<!-- LOCK:abc -->\nbody mentions -->\n again";
        assert_eq!(lock_token(stored), "abc");
        assert_eq!(strip_lock(stored), "body mentions -->\n again");
    }

    #[test]
    fn validate_token_rejects_marker_breaking_tokens() {
        assert!(validate_token("secret").is_ok());
        assert!(validate_token("with space").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("a -->b").is_err());
        assert!(validate_token("a -->\nb").is_err());
        assert!(validate_token("two\nlines").is_err());
    }

    #[test]
    fn valid_tokens_round_trip() {
        for token in ["t", "a-->b", "ends with -", "x --"] {
            validate_token(token).unwrap();
            let stored = apply_lock("Hello", token);
            assert_eq!(lock_token(&stored), token);
            assert_eq!(strip_lock(&stored), "Hello");
        }
    }
}
