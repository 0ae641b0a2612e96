use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;

/// Allocates and reserves a fresh note name. Nothing is written until the
/// first save.
pub fn run<S: NoteStore + ?Sized>(store: &S) -> Result<CmdResult> {
    let name = store.generate_name()?;
    let mut result = CmdResult::default().with_name(name.clone());
    result.add_message(CmdMessage::success(format!("New note: {}", name)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JotError;
    use crate::names::NameGenerator;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn returns_reserved_name() {
        let store = InMemoryStore::new();
        let result = run(&store).unwrap();
        let name = result.name.unwrap();
        assert_eq!(name.len(), 3);
        assert!(store.exists(&name));
    }

    #[test]
    fn consecutive_names_differ() {
        let store = InMemoryStore::new();
        let a = run(&store).unwrap().name.unwrap();
        let b = run(&store).unwrap().name.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_alphabet_is_exhausted() {
        let store = InMemoryStore::new().with_generator(NameGenerator::new("", 3));
        assert!(matches!(run(&store), Err(JotError::NamesExhausted)));
    }
}
