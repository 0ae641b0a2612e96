use crate::commands::helpers::{authorize, existing_note};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::limits::Limits;
use crate::lock;
use crate::store::NoteStore;

/// Locks `name` with `new_token`. Relocking an already locked note needs
/// its current token.
pub fn lock<S: NoteStore + ?Sized>(
    store: &S,
    limits: &Limits,
    name: &str,
    new_token: &str,
    current_token: Option<&str>,
) -> Result<CmdResult> {
    lock::validate_token(new_token)?;

    let note = existing_note(store, name)?;
    authorize(name, &note.content, current_token)?;

    let stored = lock::apply_lock(&note.content, new_token);
    limits.check_file_size(stored.len() as u64)?;
    store.save(name, &stored)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Locked note {}", name)));
    if let Some(note) = store.find(name)? {
        result.affected_notes.push(note);
    }
    Ok(result)
}

/// Removes the lock from `name`; `token` must match it.
pub fn unlock<S: NoteStore + ?Sized>(store: &S, name: &str, token: &str) -> Result<CmdResult> {
    let note = existing_note(store, name)?;
    let mut result = CmdResult::default();

    if lock::required_token(&note.content).is_none() {
        result.add_message(CmdMessage::info(format!("Note {} is not locked", name)));
        return Ok(result);
    }
    authorize(name, &note.content, Some(token))?;

    store.save(name, lock::strip_lock(&note.content))?;
    result.add_message(CmdMessage::success(format!("Unlocked note {}", name)));
    if let Some(note) = store.find(name)? {
        result.affected_notes.push(note);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JotError;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn lock_then_unlock() {
        let store = InMemoryStore::new();
        let limits = Limits::default();
        store.save("abc", "Hello").unwrap();

        lock(&store, &limits, "abc", "secret", None).unwrap();
        assert_eq!(store.load("abc").unwrap(), "<!-- LOCK:secret -->\nHello");

        assert!(matches!(
            unlock(&store, "abc", "wrong"),
            Err(JotError::Locked(_))
        ));
        unlock(&store, "abc", "secret").unwrap();
        assert_eq!(store.load("abc").unwrap(), "Hello");
    }

    #[test]
    fn relock_needs_current_token() {
        let store = InMemoryStore::new();
        let limits = Limits::default();
        store.save("abc", "Hello").unwrap();
        lock(&store, &limits, "abc", "one", None).unwrap();

        assert!(matches!(
            lock(&store, &limits, "abc", "two", None),
            Err(JotError::Locked(_))
        ));
        lock(&store, &limits, "abc", "two", Some("one")).unwrap();
        assert_eq!(store.load("abc").unwrap(), "<!-- LOCK:two -->\nHello");
    }

    #[test]
    fn rejects_bad_tokens() {
        let store = InMemoryStore::new();
        let limits = Limits::default();
        store.save("abc", "Hello").unwrap();
        assert!(lock(&store, &limits, "abc", "", None).is_err());
        assert!(lock(&store, &limits, "abc", "a -->b", None).is_err());
        assert!(lock(&store, &limits, "abc", "a\nb", None).is_err());
    }

    #[test]
    fn unlock_of_unlocked_note_is_informational() {
        let store = InMemoryStore::new();
        store.save("abc", "Hello").unwrap();
        let result = unlock(&store, "abc", "any").unwrap();
        assert!(result.messages[0].content.contains("not locked"));
    }

    #[test]
    fn lock_of_missing_note_fails() {
        let store = InMemoryStore::new();
        assert!(matches!(
            lock(&store, &Limits::default(), "abc", "t", None),
            Err(JotError::Api(_))
        ));
    }
}
