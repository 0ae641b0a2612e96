use crate::error::{JotError, Result};
use crate::lock;
use crate::model::Note;
use crate::store::NoteStore;

/// Checks `provided` against the lock on `stored`. Unlocked content (or a
/// malformed marker) needs no token.
pub fn authorize(name: &str, stored: &str, provided: Option<&str>) -> Result<()> {
    match lock::required_token(stored) {
        Some(required) if provided != Some(required) => Err(JotError::Locked(name.to_string())),
        _ => Ok(()),
    }
}

/// Looks up `name`, failing when it does not exist in either tier.
pub fn existing_note<S: NoteStore + ?Sized>(store: &S, name: &str) -> Result<Note> {
    store
        .find(name)?
        .ok_or_else(|| JotError::Api(format!("Note {} not found", name)))
}
