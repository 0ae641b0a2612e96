//! # Storage Layer
//!
//! The [`NoteStore`] trait is the single entry point to note persistence.
//! Every method takes `&self`: stores are internally synchronized and shared
//! between request handlers and the background sweeper through an `Arc`.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage on the filesystem
//! - [`memory::InMemoryStore`]: in-memory storage for command tests
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <active_root>/
//! ├── .notes_index        # name -> partition map (JSON object)
//! ├── .staging/           # temp files for atomic writes
//! ├── 20240301/
//! │   └── abc             # note "abc", last saved 2024-03-01
//! └── 20240302/
//!     └── x9k
//! <backup_root>/
//! └── 20240110/
//!     └── old             # swept after a week of inactivity
//! ```
//!
//! A note moves to today's partition every time it is saved, so a partition's
//! newest file tells the sweeper when it was last touched.

use crate::error::Result;
use crate::model::Note;
use chrono::{DateTime, Utc};

pub mod fs;
pub mod memory;

/// Outcome of [`NoteStore::move_stale`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Partitions renamed wholesale into the backup tier.
    pub partitions_moved: usize,
    /// Partitions merged file by file into an existing backup partition.
    pub partitions_merged: usize,
    /// Notes evicted from the active tier.
    pub notes_moved: usize,
    /// Loose files from the pre-partition layout moved to backup.
    pub legacy_moved: usize,
    /// One line per partition or file that could not be moved.
    pub failures: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.partitions_moved == 0
            && self.partitions_merged == 0
            && self.notes_moved == 0
            && self.legacy_moved == 0
            && self.failures.is_empty()
    }
}

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Loose files moved into the partition of their modification date.
    pub migrated_legacy: usize,
    /// Index entries dropped because their file was gone.
    pub evicted_entries: usize,
    /// Files on disk that were missing from the index.
    pub recovered_notes: usize,
    /// Notes indexed after the repair.
    pub indexed_notes: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.migrated_legacy == 0 && self.evicted_entries == 0 && self.recovered_notes == 0
    }
}

pub trait NoteStore: Send + Sync {
    /// Allocates a fresh name and reserves it. Fails with
    /// [`crate::error::JotError::NamesExhausted`] when no name could be found.
    fn generate_name(&self) -> Result<String>;

    /// Whether `name` is acceptable as a note name for this store.
    fn is_safe_name(&self, name: &str) -> bool;

    /// Whether an active note (or a reservation) exists under `name`.
    fn exists(&self, name: &str) -> bool;

    /// Writes `content` into today's partition. Empty content deletes the note.
    fn save(&self, name: &str, content: &str) -> Result<()>;

    /// The stored bytes of `name`, active tier first, then backup.
    /// A missing note reads as the empty string.
    fn load(&self, name: &str) -> Result<String>;

    /// Like [`NoteStore::load`] but with metadata; `None` when missing.
    fn find(&self, name: &str) -> Result<Option<Note>>;

    /// Active notes, newest first.
    fn list_active(&self) -> Result<Vec<Note>>;

    /// Backup notes, newest partition first, then by name.
    fn list_backup(&self) -> Result<Vec<Note>>;

    /// Moves partitions with no file modified since `cutoff` to the backup tier.
    fn move_stale(&self, cutoff: DateTime<Utc>) -> Result<SweepReport>;

    /// Migrates legacy files, rebuilds the index and reconciles the cache.
    fn doctor(&self) -> Result<DoctorReport>;

    /// Total bytes held by active notes.
    fn active_size(&self) -> Result<u64>;

    /// Number of indexed active notes.
    fn active_count(&self) -> usize;
}
