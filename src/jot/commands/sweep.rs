use crate::clock::Clock;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use crate::sweep;

/// Moves partitions idle for longer than `inactivity` to the backup tier.
pub fn run<S: NoteStore + ?Sized>(
    store: &S,
    clock: &dyn Clock,
    inactivity: chrono::Duration,
) -> Result<CmdResult> {
    let report = sweep::run_once(store, clock, inactivity)?;
    let mut result = CmdResult::default();

    if report.is_empty() {
        result.add_message(CmdMessage::info("Nothing to sweep."));
    } else {
        let partitions = report.partitions_moved + report.partitions_merged;
        if partitions > 0 {
            result.add_message(CmdMessage::success(format!(
                "Moved {} note(s) from {} partition(s) to backup.",
                report.notes_moved, partitions
            )));
        }
        if report.legacy_moved > 0 {
            result.add_message(CmdMessage::success(format!(
                "Moved {} legacy note(s) to backup.",
                report.legacy_moved
            )));
        }
        for failure in &report.failures {
            result.add_message(CmdMessage::warning(format!("  - {}", failure)));
        }
    }

    Ok(result.with_sweep(report))
}
