use crate::commands::limits::snapshot;
use crate::commands::{CmdResult, Stats};
use crate::error::Result;
use crate::limits::Limits;
use crate::lock;
use crate::store::NoteStore;

pub fn run<S: NoteStore + ?Sized>(store: &S, limits: &Limits) -> Result<CmdResult> {
    let active = store.list_active()?;
    let locked_notes = active
        .iter()
        .filter(|n| lock::required_token(&n.content).is_some())
        .count();

    let stats = Stats {
        active_notes: active.len(),
        active_bytes: store.active_size()?,
        backup_notes: store.list_backup()?.len(),
        locked_notes,
        limits: snapshot(limits),
    };
    Ok(CmdResult::default().with_stats(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn counts_notes_and_bytes() {
        let store = InMemoryStore::new();
        store.save("a", "1234").unwrap();
        store.save("b", "<!-- LOCK:t -->\nx").unwrap();
        store.insert_backup("20230101", "old", "x");

        let stats = run(&store, &Limits::new(10, 20, 3)).unwrap().stats.unwrap();
        assert_eq!(stats.active_notes, 2);
        assert_eq!(stats.active_bytes, 4 + 17);
        assert_eq!(stats.backup_notes, 1);
        assert_eq!(stats.locked_notes, 1);
        assert_eq!(stats.limits.max_note_count, 3);
    }
}
