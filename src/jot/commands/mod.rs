//! # Command Layer
//!
//! Each operation lives in its own submodule as a plain function over a
//! [`NoteStore`](crate::store::NoteStore). Commands enforce the rules that sit
//! above raw storage (locks, limits, reporting) and return a [`CmdResult`];
//! they never print, prompt or exit.
//!
//! Command tests use `InMemoryStore`, so the file layout never leaks into
//! them.
//!
//! - [`new`]: allocate a fresh note name
//! - [`save`]: write a note, enforcing locks and limits
//! - [`view`]: read a note, checking its lock
//! - [`delete`]: remove a note
//! - [`lock`]: add, replace or remove a note's lock
//! - [`list`]: list active or backup notes
//! - [`sweep`]: move idle partitions to backup
//! - [`doctor`]: repair index and layout
//! - [`stats`]: usage against the limits
//! - [`limits`]: read and change the limits
//! - [`config`]: show the effective configuration
//! - [`helpers`]: lock checks and lookups shared by the commands

use crate::config::JotConfig;
use crate::model::Note;
use crate::store::SweepReport;
use serde::Serialize;
use std::path::PathBuf;

pub mod config;
pub mod delete;
pub mod doctor;
pub mod helpers;
pub mod limits;
pub mod list;
pub mod lock;
pub mod new;
pub mod save;
pub mod stats;
pub mod sweep;
pub mod view;

#[derive(Debug, Clone)]
pub struct JotPaths {
    /// Holds `config.json` and, by default, both tiers.
    pub home: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Usage numbers reported by [`stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub active_notes: usize,
    pub active_bytes: u64,
    pub backup_notes: usize,
    pub locked_notes: usize,
    pub limits: LimitsView,
}

/// A snapshot of the configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitsView {
    pub max_file_size: u64,
    pub max_total_size: u64,
    pub max_note_count: usize,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_notes: Vec<Note>,
    pub listed_notes: Vec<Note>,
    /// Generated name from [`new`].
    pub name: Option<String>,
    /// Note body returned by [`view`].
    pub content: Option<String>,
    pub sweep: Option<SweepReport>,
    pub stats: Option<Stats>,
    pub limits: Option<LimitsView>,
    pub config: Option<JotConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_notes(mut self, notes: Vec<Note>) -> Self {
        self.affected_notes = notes;
        self
    }

    pub fn with_listed_notes(mut self, notes: Vec<Note>) -> Self {
        self.listed_notes = notes;
        self
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_sweep(mut self, report: SweepReport) -> Self {
        self.sweep = Some(report);
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_limits(mut self, limits: LimitsView) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_config(mut self, config: JotConfig) -> Self {
        self.config = Some(config);
        self
    }
}
