//! Global write limits.
//!
//! Each limit sits behind its own `RwLock`: request paths only take read
//! locks, and an admin updating one limit never stalls checks on another.

use crate::config::JotConfig;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

pub const MIB: u64 = 1024 * 1024;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * MIB;
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 500 * MIB;
pub const DEFAULT_MAX_NOTE_COUNT: usize = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("File size exceeds maximum limit of {limit} bytes ({} MB)", limit / MIB)]
    FileTooLarge { size: u64, limit: u64 },

    #[error(
        "Total file size would exceed maximum limit of {} MB (current: {}, would be: {})",
        limit / MIB,
        format_mb(*current),
        format_mb(*projected)
    )]
    TotalSizeExceeded {
        current: u64,
        projected: u64,
        limit: u64,
    },

    #[error("Maximum number of notes ({limit}) has been reached. Delete some notes or raise the limit.")]
    NoteCountReached { limit: usize },
}

fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB as f64)
}

#[derive(Debug)]
pub struct Limits {
    max_file_size: RwLock<u64>,
    max_total_size: RwLock<u64>,
    max_note_count: RwLock<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE,
            DEFAULT_MAX_TOTAL_SIZE,
            DEFAULT_MAX_NOTE_COUNT,
        )
    }
}

impl Limits {
    pub fn new(max_file_size: u64, max_total_size: u64, max_note_count: usize) -> Self {
        Self {
            max_file_size: RwLock::new(max_file_size),
            max_total_size: RwLock::new(max_total_size),
            max_note_count: RwLock::new(max_note_count),
        }
    }

    pub fn from_config(config: &JotConfig) -> Self {
        Self::new(
            config.max_file_size,
            config.max_total_size,
            config.max_note_count,
        )
    }

    pub fn max_file_size(&self) -> u64 {
        *self.max_file_size.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_max_file_size(&self, value: u64) {
        *self
            .max_file_size
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn max_total_size(&self) -> u64 {
        *self
            .max_total_size
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_max_total_size(&self, value: u64) {
        *self
            .max_total_size
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn max_note_count(&self) -> usize {
        *self
            .max_note_count
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_max_note_count(&self, value: usize) {
        *self
            .max_note_count
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn check_file_size(&self, size: u64) -> Result<(), LimitError> {
        let limit = self.max_file_size();
        if size > limit {
            return Err(LimitError::FileTooLarge { size, limit });
        }
        Ok(())
    }

    /// `current_total` includes the note's present size `old_size`, which the
    /// write replaces with `new_size`.
    pub fn check_total_size(
        &self,
        current_total: u64,
        old_size: u64,
        new_size: u64,
    ) -> Result<(), LimitError> {
        let limit = self.max_total_size();
        let projected = current_total.saturating_sub(old_size) + new_size;
        if projected > limit {
            return Err(LimitError::TotalSizeExceeded {
                current: current_total,
                projected,
                limit,
            });
        }
        Ok(())
    }

    pub fn check_note_count(&self, current: usize) -> Result<(), LimitError> {
        let limit = self.max_note_count();
        if current >= limit {
            return Err(LimitError::NoteCountReached { limit });
        }
        Ok(())
    }

    /// Copies the current limits into `config` for saving.
    pub fn write_to(&self, config: &mut JotConfig) {
        config.max_file_size = self.max_file_size();
        config.max_total_size = self.max_total_size();
        config.max_note_count = self.max_note_count();
    }
}

/// Parses sizes like `"10M"`, `"100MB"`, `"1.5G"` or `"512"` into bytes.
pub fn parse_size(input: &str) -> Result<u64, String> {
    let upper = input.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err("empty size string".to_string());
    }

    let trimmed = upper
        .strip_suffix("BYTES")
        .or_else(|| upper.strip_suffix("BYTE"))
        .or_else(|| upper.strip_suffix('B'))
        .unwrap_or(&upper)
        .trim();
    if trimmed.is_empty() {
        return Err(format!("invalid size format: {}", input));
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid number in size: {}", input))?;
    let multiplier: u64 = match unit.trim() {
        "" => 1,
        "K" => 1024,
        "M" => MIB,
        "G" => 1024 * MIB,
        "T" => 1024 * 1024 * MIB,
        other => return Err(format!("unknown size unit: {}", other)),
    };

    Ok((value * multiplier as f64) as u64)
}
