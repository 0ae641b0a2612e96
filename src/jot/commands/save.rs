use crate::commands::helpers::authorize;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{JotError, Result};
use crate::limits::Limits;
use crate::lock;
use crate::store::NoteStore;

/// What a save does to the note's lock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LockChange {
    /// Keep whatever lock the note already has.
    #[default]
    Keep,
    /// Lock with this token, replacing any existing one.
    Set(String),
    /// Store the body unlocked.
    Clear,
}

/// Writes `body` to `name`.
///
/// A locked note needs its token in `token`. Empty `body` deletes the note.
/// Limits are checked against the bytes actually stored, lock marker
/// included: file size always, note count only when the note is new, total
/// size with the note's current size replaced.
pub fn run<S: NoteStore + ?Sized>(
    store: &S,
    limits: &Limits,
    name: &str,
    body: &str,
    token: Option<&str>,
    lock_change: LockChange,
) -> Result<CmdResult> {
    if !store.is_safe_name(name) {
        return Err(JotError::UnsafeName(name.to_string()));
    }
    if let LockChange::Set(new_token) = &lock_change {
        lock::validate_token(new_token)?;
    }

    let existing = store.find(name)?;
    let existing_content = existing.as_ref().map_or("", |n| n.content.as_str());
    authorize(name, existing_content, token)?;

    let mut result = CmdResult::default();

    if body.is_empty() {
        store.save(name, "")?;
        result.add_message(CmdMessage::success(format!("Deleted note {}", name)));
        return Ok(result);
    }

    let lock_token = match &lock_change {
        LockChange::Keep => lock::lock_token(existing_content).to_string(),
        LockChange::Set(token) => token.clone(),
        LockChange::Clear => String::new(),
    };
    let stored = lock::apply_lock(body, &lock_token);
    let new_size = stored.len() as u64;

    limits.check_file_size(new_size)?;
    // Reserved names sit in the cache without a file, so ask the store.
    let is_new = existing.as_ref().map_or(true, |n| n.is_backup);
    if is_new {
        limits.check_note_count(store.active_count())?;
    }
    let old_size = existing
        .as_ref()
        .filter(|n| !n.is_backup)
        .map_or(0, |n| n.size);
    limits.check_total_size(store.active_size()?, old_size, new_size)?;

    store.save(name, &stored)?;

    if let Some(note) = store.find(name)? {
        result.affected_notes.push(note);
    }
    let verb = if existing.is_some() { "Saved" } else { "Created" };
    result.add_message(CmdMessage::success(format!("{} note {}", verb, name)));
    match lock_change {
        LockChange::Set(_) => result.add_message(CmdMessage::info("Note is locked")),
        LockChange::Clear if lock::required_token(existing_content).is_some() => {
            result.add_message(CmdMessage::info("Lock removed"))
        }
        _ => {}
    }
    Ok(result)
}
