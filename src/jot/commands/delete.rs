use crate::commands::helpers::{authorize, existing_note};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;

/// Deletes `name` by saving empty content. The newest copy goes, whichever
/// tier it is in.
pub fn run<S: NoteStore + ?Sized>(store: &S, name: &str, token: Option<&str>) -> Result<CmdResult> {
    let note = existing_note(store, name)?;
    authorize(name, &note.content, token)?;

    store.save(name, "")?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deleted {} note {}",
        note.tier(),
        name
    )));
    result.affected_notes.push(note);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JotError;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn deletes_active_note() {
        let store = InMemoryStore::new();
        store.save("abc", "x").unwrap();
        let result = run(&store, "abc", None).unwrap();
        assert!(result.messages[0].content.contains("Deleted active note abc"));
        assert!(!store.exists("abc"));
        assert_eq!(store.load("abc").unwrap(), "");
    }

    #[test]
    fn missing_note_is_an_error() {
        let store = InMemoryStore::new();
        assert!(matches!(run(&store, "abc", None), Err(JotError::Api(_))));
    }

    #[test]
    fn locked_note_needs_token() {
        let store = InMemoryStore::new();
        store.save("abc", "<!-- LOCK:t -->\nx").unwrap();
        assert!(matches!(run(&store, "abc", None), Err(JotError::Locked(_))));
        run(&store, "abc", Some("t")).unwrap();
        assert!(!store.exists("abc"));
    }
}
