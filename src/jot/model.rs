use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage tier a note lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Active,
    Backup,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Active => write!(f, "active"),
            Tier::Backup => write!(f, "backup"),
        }
    }
}

/// A note as read from storage.
///
/// Built fresh from file metadata and bytes on every read; nothing holds on
/// to these beyond a single listing or response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
    pub size: u64,
    /// `YYYYMMDD` partition the file sits in. Empty for loose legacy files.
    pub date_dir: String,
    pub is_backup: bool,
}

impl Note {
    pub fn tier(&self) -> Tier {
        if self.is_backup {
            Tier::Backup
        } else {
            Tier::Active
        }
    }
}

/// Sort newest first, then by name so equal timestamps list deterministically.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}
