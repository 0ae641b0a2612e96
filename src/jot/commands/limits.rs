use crate::commands::{CmdMessage, CmdResult, JotPaths, LimitsView};
use crate::config::JotConfig;
use crate::error::{JotError, Result};
use crate::limits::Limits;

/// Requested limit changes; `None` leaves a limit alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitsUpdate {
    pub max_file_size: Option<u64>,
    pub max_total_size: Option<u64>,
    pub max_note_count: Option<usize>,
}

impl LimitsUpdate {
    pub fn is_empty(&self) -> bool {
        self.max_file_size.is_none() && self.max_total_size.is_none() && self.max_note_count.is_none()
    }
}

pub fn snapshot(limits: &Limits) -> LimitsView {
    LimitsView {
        max_file_size: limits.max_file_size(),
        max_total_size: limits.max_total_size(),
        max_note_count: limits.max_note_count(),
    }
}

/// Applies `update` to the live limits and persists them to `config.json`.
pub fn run(
    limits: &Limits,
    update: LimitsUpdate,
    config: &mut JotConfig,
    paths: &JotPaths,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if !update.is_empty() {
        if update.max_file_size == Some(0)
            || update.max_total_size == Some(0)
            || update.max_note_count == Some(0)
        {
            return Err(JotError::Api("Limits must be greater than zero".to_string()));
        }

        if let Some(size) = update.max_file_size {
            limits.set_max_file_size(size);
        }
        if let Some(size) = update.max_total_size {
            limits.set_max_total_size(size);
        }
        if let Some(count) = update.max_note_count {
            limits.set_max_note_count(count);
        }

        limits.write_to(config);
        config.save(&paths.home)?;
        result.add_message(CmdMessage::success("Limits updated."));
    }

    Ok(result.with_limits(snapshot(limits)))
}
