use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;

pub fn run<S: NoteStore + ?Sized>(store: &S) -> Result<CmdResult> {
    let report = store.doctor()?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success(format!(
            "No inconsistencies found ({} notes indexed).",
            report.indexed_notes
        )));
    } else {
        result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
        if report.migrated_legacy > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Moved {} legacy note(s) into date partitions.",
                report.migrated_legacy
            )));
        }
        if report.evicted_entries > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Removed {} index entr(ies) with no file on disk.",
                report.evicted_entries
            )));
        }
        if report.recovered_notes > 0 {
            result.add_message(CmdMessage::success(format!(
                "  - Recovered {} note(s) found on disk but missing from the index.",
                report.recovered_notes
            )));
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn doctor_no_inconsistencies() {
        let store = InMemoryStore::new();
        store.save("abc", "x").unwrap();

        let result = run(&store).unwrap();

        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].content.contains("No inconsistencies"));
        assert!(result.messages[0].content.contains("1 notes indexed"));
    }
}
