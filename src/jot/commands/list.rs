use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Tier;
use crate::store::NoteStore;

pub fn run<S: NoteStore + ?Sized>(store: &S, tier: Tier) -> Result<CmdResult> {
    let notes = match tier {
        Tier::Active => store.list_active()?,
        Tier::Backup => store.list_backup()?,
    };

    let mut result = CmdResult::default();
    if notes.is_empty() {
        result.add_message(CmdMessage::info(format!("No {} notes", tier)));
    }
    Ok(result.with_listed_notes(notes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn lists_active_notes() {
        let store = InMemoryStore::new();
        store.save("a", "1").unwrap();
        store.save("b", "2").unwrap();
        let result = run(&store, Tier::Active).unwrap();
        assert_eq!(result.listed_notes.len(), 2);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn lists_backup_notes() {
        let store = InMemoryStore::new();
        store.save("a", "1").unwrap();
        store.insert_backup("20230101", "old", "x");
        let result = run(&store, Tier::Backup).unwrap();
        assert_eq!(result.listed_notes.len(), 1);
        assert!(result.listed_notes[0].is_backup);
    }

    #[test]
    fn empty_listing_says_so() {
        let store = InMemoryStore::new();
        let result = run(&store, Tier::Backup).unwrap();
        assert!(result.listed_notes.is_empty());
        assert_eq!(result.messages[0].content, "No backup notes");
    }
}
