use crate::commands::helpers::authorize;
use crate::commands::CmdResult;
use crate::error::{JotError, Result};
use crate::lock;
use crate::store::NoteStore;

/// Reads `name`. A locked note needs its token; the lock marker is stripped
/// unless `raw` is set. A missing note reads as empty.
pub fn run<S: NoteStore + ?Sized>(
    store: &S,
    name: &str,
    token: Option<&str>,
    raw: bool,
) -> Result<CmdResult> {
    if !store.is_safe_name(name) {
        return Err(JotError::UnsafeName(name.to_string()));
    }

    let Some(note) = store.find(name)? else {
        return Ok(CmdResult::default().with_content(String::new()));
    };

    authorize(name, &note.content, token)?;
    let body = if raw {
        note.content.clone()
    } else {
        lock::strip_lock(&note.content).to_string()
    };
    Ok(CmdResult::default()
        .with_content(body)
        .with_affected_notes(vec![note]))
}
