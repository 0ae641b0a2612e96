//! # Path Index
//!
//! Notes live in date partitions: `<active>/YYYYMMDD/<name>`. The partition a
//! note sits in changes every time it is saved, so the store keeps a map from
//! note name to partition instead of probing every directory.
//!
//! ## Persistence
//!
//! The map is persisted as a JSON object (`{"name": "YYYYMMDD", ...}`) in the
//! side-car file `<active>/.notes_index`. Mutations only touch memory;
//! callers persist at natural batch points (after a save, once per sweep).
//! Side-car reads and writes are serialized by a dedicated mutex so the
//! in-memory map stays readable while the file is being written.
//!
//! ## Self-healing
//!
//! The side-car is a cache of what the directory tree already says. When it
//! is missing or unparsable the index is rebuilt by scanning the partitions,
//! so corruption costs a rescan and never loses notes. Entries pointing at
//! files that have since disappeared are evicted the next time they fail to
//! resolve.
//!
//! ## Backup lookups
//!
//! Notes moved to the backup tier are not indexed. [`PathIndex::resolve`]
//! falls back to scanning backup partitions, newest partition first, so a
//! name present in several backup partitions resolves to the most recent one.

use crate::error::{JotError, Result};
use crate::model::Tier;
use crate::names::is_safe_name;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const INDEX_FILE_NAME: &str = ".notes_index";

/// Whether `name` looks like a `YYYYMMDD` partition.
pub fn is_date_dir(name: &str) -> bool {
    name.len() == 8 && name.bytes().all(|b| b.is_ascii_digit())
}

/// Partition directory names directly under `root`, ascending.
/// A missing root has no partitions.
pub fn date_partitions(root: &Path) -> io::Result<Vec<String>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_date_dir(name) {
                dirs.push(name.to_string());
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Where a note was found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub date_dir: String,
    pub tier: Tier,
}

/// Outcome of [`PathIndex::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub location: Option<Location>,
    /// The active entry pointed at a vanished file and was dropped.
    pub evicted: bool,
}

/// How [`PathIndex::load`] obtained its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Rebuilt(usize),
}

impl LoadOutcome {
    pub fn count(&self) -> usize {
        match self {
            LoadOutcome::Loaded(n) | LoadOutcome::Rebuilt(n) => *n,
        }
    }
}

pub struct PathIndex {
    active_root: PathBuf,
    backup_root: PathBuf,
    index_file: PathBuf,
    max_name_len: usize,
    entries: DashMap<String, String>,
    file_lock: Mutex<()>,
}

impl PathIndex {
    /// Creates an empty index; nothing is read until [`PathIndex::load`].
    pub fn new(active_root: PathBuf, backup_root: PathBuf, max_name_len: usize) -> Self {
        let index_file = active_root.join(INDEX_FILE_NAME);
        Self {
            active_root,
            backup_root,
            index_file,
            max_name_len,
            entries: DashMap::new(),
            file_lock: Mutex::new(()),
        }
    }

    /// Creates the index and loads it from the side-car (or a rescan).
    pub fn open(
        active_root: PathBuf,
        backup_root: PathBuf,
        max_name_len: usize,
    ) -> Result<(Self, LoadOutcome)> {
        fs::create_dir_all(&active_root).map_err(JotError::Io)?;
        let index = Self::new(active_root, backup_root, max_name_len);
        let outcome = index.load()?;
        Ok((index, outcome))
    }

    pub fn active_root(&self) -> &Path {
        &self.active_root
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    /// Reads the side-car, rebuilding from disk when it is missing or broken.
    pub fn load(&self) -> Result<LoadOutcome> {
        let _guard = self.lock_file();

        let data = match fs::read_to_string(&self.index_file) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.index_file.display(), "no note index, scanning partitions");
                return self.rebuild_locked().map(LoadOutcome::Rebuilt);
            }
            Err(e) => {
                warn!(error = %e, "failed to read note index, rebuilding");
                return self.rebuild_locked().map(LoadOutcome::Rebuilt);
            }
        };

        let parsed: HashMap<String, String> = match serde_json::from_str(&data) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "note index is corrupt, rebuilding");
                return self.rebuild_locked().map(LoadOutcome::Rebuilt);
            }
        };

        self.entries.clear();
        for (name, date_dir) in parsed {
            if is_safe_name(&name, self.max_name_len) && is_date_dir(&date_dir) {
                self.entries.insert(name, date_dir);
            } else {
                warn!(name = %name, date_dir = %date_dir, "skipping invalid index entry");
            }
        }

        let count = self.entries.len();
        info!(notes = count, "loaded note index");
        Ok(LoadOutcome::Loaded(count))
    }

    /// Rescans the active partitions and replaces the index with what is on
    /// disk. Returns the number of indexed notes.
    pub fn rebuild(&self) -> Result<usize> {
        let _guard = self.lock_file();
        self.rebuild_locked()
    }

    fn rebuild_locked(&self) -> Result<usize> {
        fs::create_dir_all(&self.active_root).map_err(JotError::Io)?;

        // Ascending scan: a name found in two partitions keeps the newer one.
        let mut scanned: HashMap<String, String> = HashMap::new();
        for date_dir in date_partitions(&self.active_root).map_err(JotError::Io)? {
            let dir_path = self.active_root.join(&date_dir);
            let files = match fs::read_dir(&dir_path) {
                Ok(files) => files,
                Err(e) => {
                    warn!(partition = %date_dir, error = %e, "skipping unreadable partition");
                    continue;
                }
            };
            for file in files.flatten() {
                let is_file = file.file_type().map(|t| t.is_file()).unwrap_or(false);
                if !is_file {
                    continue;
                }
                if let Some(name) = file.file_name().to_str() {
                    if is_safe_name(name, self.max_name_len) {
                        scanned.insert(name.to_string(), date_dir.clone());
                    }
                }
            }
        }

        self.entries.retain(|name, _| scanned.contains_key(name));
        for (name, date_dir) in scanned {
            self.entries.insert(name, date_dir);
        }

        self.write_locked()?;
        let count = self.entries.len();
        info!(notes = count, "rebuilt note index");
        Ok(count)
    }

    /// Writes the side-car file.
    pub fn persist(&self) -> Result<()> {
        let _guard = self.lock_file();
        self.write_locked()
    }

    fn write_locked(&self) -> Result<()> {
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let content = serde_json::to_string(&snapshot).map_err(JotError::Serialization)?;

        fs::create_dir_all(&self.active_root).map_err(JotError::Io)?;
        let tmp_file = self
            .active_root
            .join(format!("{}-{}.tmp", INDEX_FILE_NAME, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(JotError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &self.index_file) {
            let _ = fs::remove_file(&tmp_file);
            return Err(JotError::Io(e));
        }
        Ok(())
    }

    fn lock_file(&self) -> std::sync::MutexGuard<'_, ()> {
        self.file_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(|e| e.value().clone())
    }

    pub fn put(&self, name: &str, date_dir: &str) {
        self.entries.insert(name.to_string(), date_dir.to_string());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.entries.remove(name).map(|(_, date_dir)| date_dir)
    }

    /// Removes `name` only while it still points at `date_dir`.
    pub fn remove_if_in(&self, name: &str, date_dir: &str) -> bool {
        self.entries
            .remove_if(name, |_, current| current == date_dir)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// A sorted copy of all entries. Iterate this, not the live map, when the
    /// loop body may mutate the index.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort();
        entries
    }

    /// Path a note would have in the active tier under `date_dir`.
    pub fn active_path(&self, date_dir: &str, name: &str) -> PathBuf {
        self.active_root.join(date_dir).join(name)
    }

    /// Finds the file for `name`: the indexed active partition first, then the
    /// backup partitions. A stale active entry is evicted and the eviction
    /// persisted. Backup hits are not added to the index.
    pub fn resolve(&self, name: &str) -> Resolution {
        let mut evicted = false;

        if let Some(date_dir) = self.get(name) {
            let path = self.active_path(&date_dir, name);
            if path.is_file() {
                return Resolution {
                    location: Some(Location {
                        path,
                        date_dir,
                        tier: Tier::Active,
                    }),
                    evicted: false,
                };
            }

            if self.remove_if_in(name, &date_dir) {
                debug!(note = %name, partition = %date_dir, "evicting stale index entry");
                evicted = true;
                if let Err(e) = self.persist() {
                    warn!(error = %e, "failed to persist index after eviction");
                }
            }
        }

        Resolution {
            location: self.find_in_backup(name),
            evicted,
        }
    }

    /// Looks for `name` in the backup partitions, newest first.
    pub fn find_in_backup(&self, name: &str) -> Option<Location> {
        let partitions = match date_partitions(&self.backup_root) {
            Ok(partitions) => partitions,
            Err(e) => {
                warn!(error = %e, "failed to scan backup partitions");
                return None;
            }
        };

        partitions.into_iter().rev().find_map(|date_dir| {
            let path = self.backup_root.join(&date_dir).join(name);
            path.is_file().then_some(Location {
                path,
                date_dir,
                tier: Tier::Backup,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathIndex) {
        let tmp = TempDir::new().unwrap();
        let index = PathIndex::new(tmp.path().join("active"), tmp.path().join("backup"), 20);
        fs::create_dir_all(index.active_root()).unwrap();
        (tmp, index)
    }

    fn write_note(root: &Path, date_dir: &str, name: &str, content: &str) {
        let dir = root.join(date_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn date_dir_pattern() {
        assert!(is_date_dir("20240131"));
        assert!(!is_date_dir("2024013"));
        assert!(!is_date_dir("2024-01-3"));
        assert!(!is_date_dir("202401311"));
        assert!(!is_date_dir(".staging"));
    }

    #[test]
    fn missing_side_car_triggers_rebuild() {
        let (_tmp, index) = setup();
        write_note(index.active_root(), "20240101", "abc", "one");
        write_note(index.active_root(), "20240102", "def", "two");

        let outcome = index.load().unwrap();
        assert_eq!(outcome, LoadOutcome::Rebuilt(2));
        assert_eq!(index.get("abc").as_deref(), Some("20240101"));
        assert!(index.index_file().exists());
    }

    #[test]
    fn corrupt_side_car_triggers_rebuild() {
        let (_tmp, index) = setup();
        write_note(index.active_root(), "20240101", "abc", "one");
        fs::write(index.index_file(), "{not json").unwrap();

        let outcome = index.load().unwrap();
        assert_eq!(outcome, LoadOutcome::Rebuilt(1));

        let on_disk: HashMap<String, String> =
            serde_json::from_str(&fs::read_to_string(index.index_file()).unwrap()).unwrap();
        assert_eq!(on_disk.get("abc").map(String::as_str), Some("20240101"));
    }

    #[test]
    fn persisted_index_loads_back() {
        let (_tmp, index) = setup();
        index.put("abc", "20240101");
        index.put("xyz", "20240205");
        index.persist().unwrap();

        let reloaded = PathIndex::new(
            index.active_root().to_path_buf(),
            index.backup_root().to_path_buf(),
            20,
        );
        assert_eq!(reloaded.load().unwrap(), LoadOutcome::Loaded(2));
        assert_eq!(reloaded.get("xyz").as_deref(), Some("20240205"));
    }

    #[test]
    fn load_skips_unsafe_entries() {
        let (_tmp, index) = setup();
        fs::write(
            index.index_file(),
            r#"{"ok":"20240101","../etc":"20240101","bad":"nope"}"#,
        )
        .unwrap();

        assert_eq!(index.load().unwrap(), LoadOutcome::Loaded(1));
        assert!(index.get("ok").is_some());
        assert!(index.get("../etc").is_none());
    }

    #[test]
    fn rebuild_ignores_non_partition_dirs_and_keeps_newest_duplicate() {
        let (_tmp, index) = setup();
        write_note(index.active_root(), "20240101", "dup", "old");
        write_note(index.active_root(), "20240301", "dup", "new");
        write_note(index.active_root(), "notes", "stray", "x");
        fs::write(index.active_root().join("loose"), "x").unwrap();

        assert_eq!(index.rebuild().unwrap(), 1);
        assert_eq!(index.get("dup").as_deref(), Some("20240301"));
        assert!(index.get("stray").is_none());
        assert!(index.get("loose").is_none());
    }

    #[test]
    fn resolve_finds_active_note() {
        let (_tmp, index) = setup();
        write_note(index.active_root(), "20240101", "abc", "one");
        index.put("abc", "20240101");

        let resolution = index.resolve("abc");
        let location = resolution.location.unwrap();
        assert_eq!(location.tier, Tier::Active);
        assert_eq!(location.date_dir, "20240101");
        assert!(!resolution.evicted);
    }

    #[test]
    fn resolve_evicts_stale_entry() {
        let (_tmp, index) = setup();
        index.put("gone", "20240101");

        let resolution = index.resolve("gone");
        assert!(resolution.location.is_none());
        assert!(resolution.evicted);
        assert!(index.get("gone").is_none());

        let on_disk: HashMap<String, String> =
            serde_json::from_str(&fs::read_to_string(index.index_file()).unwrap()).unwrap();
        assert!(!on_disk.contains_key("gone"));
    }

    #[test]
    fn resolve_falls_back_to_newest_backup_partition() {
        let (_tmp, index) = setup();
        write_note(index.backup_root(), "20230101", "old", "first");
        write_note(index.backup_root(), "20230601", "old", "second");

        let location = index.resolve("old").location.unwrap();
        assert_eq!(location.tier, Tier::Backup);
        assert_eq!(location.date_dir, "20230601");
        assert_eq!(fs::read_to_string(location.path).unwrap(), "second");
        assert!(index.get("old").is_none());
    }

    #[test]
    fn resolve_without_backup_root_is_not_found() {
        let (_tmp, index) = setup();
        assert_eq!(index.resolve("nothing"), Resolution::default());
    }

    #[test]
    fn remove_if_in_respects_current_partition() {
        let (_tmp, index) = setup();
        index.put("abc", "20240102");
        assert!(!index.remove_if_in("abc", "20240101"));
        assert!(index.remove_if_in("abc", "20240102"));
        assert!(index.is_empty());
    }

    #[test]
    fn partitions_of_missing_root_are_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(date_partitions(&tmp.path().join("nope")).unwrap().is_empty());
    }
}
