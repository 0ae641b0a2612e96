use super::{DoctorReport, NoteStore, SweepReport};
use crate::broadcast::{Broadcaster, NoopBroadcaster};
use crate::cache::ExistenceCache;
use crate::clock::{date_dir_for, Clock, SystemClock};
use crate::config::JotConfig;
use crate::error::{JotError, Result};
use crate::index::{date_partitions, LoadOutcome, PathIndex, INDEX_FILE_NAME};
use crate::model::{sort_newest_first, Note, Tier};
use crate::names::{self, NameGenerator};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

const STAGING_DIR: &str = ".staging";

/// Where and how a [`FileStore`] keeps its notes.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub active_root: PathBuf,
    pub backup_root: PathBuf,
    pub max_path_length: usize,
    pub note_chars: String,
    pub note_name_len: usize,
}

impl StoreOptions {
    pub fn new(active_root: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            active_root: active_root.into(),
            backup_root: backup_root.into(),
            max_path_length: names::DEFAULT_MAX_PATH_LENGTH,
            note_chars: names::DEFAULT_ALPHABET.to_string(),
            note_name_len: names::DEFAULT_MIN_LEN,
        }
    }

    /// Resolves the configured directories against `home`.
    pub fn from_config(config: &JotConfig, home: &Path) -> Self {
        Self {
            active_root: home.join(&config.save_dir),
            backup_root: home.join(&config.backup_dir),
            max_path_length: config.max_path_length,
            note_chars: config.note_chars.clone(),
            note_name_len: config.note_name_len,
        }
    }
}

/// A loose file sitting directly in the active root, left over from the
/// layout before date partitions.
struct LooseFile {
    name: String,
    path: PathBuf,
    modified: DateTime<Utc>,
}

pub struct FileStore {
    active_root: PathBuf,
    backup_root: PathBuf,
    staging_dir: PathBuf,
    max_name_len: usize,
    generator: NameGenerator,
    cache: ExistenceCache,
    index: PathIndex,
    note_locks: DashMap<String, Arc<Mutex<()>>>,
    clock: Arc<dyn Clock>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl FileStore {
    /// Opens the store, loading (or rebuilding) the index and seeding the
    /// existence cache from it.
    pub fn open(options: StoreOptions) -> Result<Self> {
        let (index, outcome) = PathIndex::open(
            options.active_root.clone(),
            options.backup_root.clone(),
            options.max_path_length,
        )?;

        let cache = ExistenceCache::new();
        cache.extend(index.names());

        match outcome {
            LoadOutcome::Loaded(n) => debug!(notes = n, "opened note store"),
            LoadOutcome::Rebuilt(n) => info!(notes = n, "opened note store with rebuilt index"),
        }

        Ok(Self {
            staging_dir: options.active_root.join(STAGING_DIR),
            active_root: options.active_root,
            backup_root: options.backup_root,
            max_name_len: options.max_path_length,
            generator: NameGenerator::new(&options.note_chars, options.note_name_len),
            cache,
            index,
            note_locks: DashMap::new(),
            clock: Arc::new(SystemClock),
            broadcaster: Arc::new(NoopBroadcaster),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn active_root(&self) -> &Path {
        &self.active_root
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    pub fn cache(&self) -> &ExistenceCache {
        &self.cache
    }

    fn note_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.note_locks
            .entry(name.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Drops the entry for `name` once the map holds the only reference.
    /// `remove_if` checks under the shard lock that `note_lock` also takes,
    /// so a waiter that already cloned the `Arc` keeps the entry alive.
    fn release_note_lock(&self, name: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.note_locks
            .remove_if(name, |_, held| Arc::strong_count(held) == 1);
    }

    /// Names with a save in flight (or queued).
    pub fn pending_note_locks(&self) -> usize {
        self.note_locks.len()
    }

    /// Saves `name` while its note lock is held.
    fn save_locked(&self, name: &str, content: &str) -> Result<()> {
        if content.is_empty() {
            return self.delete_locked(name);
        }

        let today = self.clock.today();
        self.write_atomic(&self.active_root.join(&today), name, content)?;

        if let Some(previous) = self.index.get(name) {
            if previous != today {
                match fs::remove_file(self.index.active_path(&previous, name)) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        warn!(note = %name, partition = %previous, error = %e, "failed to remove previous copy")
                    }
                }
            }
        }

        self.cache.add(name);
        self.index.put(name, &today);
        self.index.persist()?;
        debug!(note = %name, partition = %today, bytes = content.len(), "saved note");

        self.broadcaster.broadcast(name, content);
        Ok(())
    }

    fn delete_locked(&self, name: &str) -> Result<()> {
        let resolution = self.index.resolve(name);
        if let Some(location) = resolution.location {
            match fs::remove_file(&location.path) {
                Ok(()) => debug!(note = %name, tier = %location.tier, "deleted note"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(JotError::Io(e)),
            }
        }

        self.index.remove(name);
        self.cache.remove(name);
        self.index.persist()?;
        self.broadcaster.broadcast(name, "");
        Ok(())
    }

    /// Writes `content` to `<dir>/<name>` through a staging file so readers
    /// never observe a partial write.
    fn write_atomic(&self, dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.staging_dir).map_err(JotError::Io)?;
        let tmp_file = self.staging_dir.join(format!("{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(JotError::Io)?;

        let target = dir.join(name);
        let mut attempt = 0;
        loop {
            attempt += 1;
            if let Err(e) = fs::create_dir_all(dir) {
                let _ = fs::remove_file(&tmp_file);
                return Err(JotError::Io(e));
            }
            match fs::rename(&tmp_file, &target) {
                Ok(()) => return Ok(target),
                // The sweeper may have moved an empty partition away between
                // create_dir_all and rename.
                Err(e) if e.kind() == io::ErrorKind::NotFound && attempt < 3 => continue,
                Err(e) => {
                    let _ = fs::remove_file(&tmp_file);
                    return Err(JotError::Io(e));
                }
            }
        }
    }

    fn read_note(path: &Path, name: &str, date_dir: &str, tier: Tier) -> io::Result<Note> {
        let meta = fs::metadata(path)?;
        let content = fs::read_to_string(path)?;
        Ok(Note {
            name: name.to_string(),
            size: meta.len(),
            content,
            updated_at: modified_at(&meta),
            date_dir: date_dir.to_string(),
            is_backup: tier == Tier::Backup,
        })
    }

    /// Drops `name` from index and cache if the index still places it in
    /// `date_dir`.
    fn evict_from(&self, name: &str, date_dir: &str) {
        if self.index.remove_if_in(name, date_dir) {
            self.cache.remove(name);
        }
    }

    fn loose_files(&self) -> io::Result<Vec<LooseFile>> {
        let entries = match fs::read_dir(&self.active_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') || !self.is_safe_name(&name) {
                continue;
            }
            files.push(LooseFile {
                name,
                path: entry.path(),
                modified: modified_at(&meta),
            });
        }
        Ok(files)
    }

    fn sweep_partition(
        &self,
        date_dir: &str,
        cutoff: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> io::Result<()> {
        let source = self.active_root.join(date_dir);

        let mut files = Vec::new();
        let mut latest: Option<DateTime<Utc>> = None;
        for entry in fs::read_dir(&source)?.flatten() {
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let modified = modified_at(&meta);
            latest = Some(latest.map_or(modified, |l| l.max(modified)));
            if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }

        if matches!(latest, Some(latest) if latest >= cutoff) {
            return Ok(());
        }

        let target = self.backup_root.join(date_dir);
        if target.is_dir() {
            for name in files {
                match fs::rename(source.join(&name), target.join(&name)) {
                    Ok(()) => {
                        if self.is_safe_name(&name) {
                            self.evict_from(&name, date_dir);
                            report.notes_moved += 1;
                        }
                    }
                    Err(e) => {
                        warn!(partition = %date_dir, note = %name, error = %e, "failed to move note to backup");
                        report
                            .failures
                            .push(format!("{}/{}: {}", date_dir, name, e));
                    }
                }
            }
            // Only succeeds once every file has moved.
            let _ = fs::remove_dir(&source);
            report.partitions_merged += 1;
            debug!(partition = %date_dir, "merged partition into backup");
        } else {
            fs::create_dir_all(&self.backup_root)?;
            fs::rename(&source, &target)?;
            for name in files.iter().filter(|n| self.is_safe_name(n)) {
                self.evict_from(name, date_dir);
                report.notes_moved += 1;
            }
            report.partitions_moved += 1;
            debug!(partition = %date_dir, "moved partition to backup");
        }
        Ok(())
    }

    fn sweep_loose_files(&self, cutoff: DateTime<Utc>, report: &mut SweepReport) {
        let files = match self.loose_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "failed to scan for legacy notes");
                report.failures.push(format!("legacy scan: {}", e));
                return;
            }
        };

        for file in files.into_iter().filter(|f| f.modified < cutoff) {
            let dir = self.backup_root.join(date_dir_for(file.modified));
            let moved = fs::create_dir_all(&dir)
                .and_then(|_| fs::rename(&file.path, dir.join(&file.name)));
            match moved {
                Ok(()) => report.legacy_moved += 1,
                Err(e) => {
                    warn!(note = %file.name, error = %e, "failed to move legacy note to backup");
                    report.failures.push(format!("{}: {}", file.name, e));
                }
            }
        }
    }
}

fn modified_at(meta: &fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH))
}

impl NoteStore for FileStore {
    fn generate_name(&self) -> Result<String> {
        self.generator
            .generate(&self.cache)
            .ok_or(JotError::NamesExhausted)
    }

    fn is_safe_name(&self, name: &str) -> bool {
        names::is_safe_name(name, self.max_name_len)
    }

    fn exists(&self, name: &str) -> bool {
        self.cache.exists(name)
    }

    fn save(&self, name: &str, content: &str) -> Result<()> {
        if !self.is_safe_name(name) {
            return Err(JotError::UnsafeName(name.to_string()));
        }

        let lock = self.note_lock(name);
        let outcome = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.save_locked(name, content)
        };
        self.release_note_lock(name, lock);
        outcome
    }

    fn load(&self, name: &str) -> Result<String> {
        if !self.is_safe_name(name) {
            return Err(JotError::UnsafeName(name.to_string()));
        }

        let resolution = self.index.resolve(name);
        if resolution.evicted {
            self.cache.remove(name);
        }
        let Some(location) = resolution.location else {
            return Ok(String::new());
        };

        match fs::read_to_string(&location.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(JotError::Io(e)),
        }
    }

    fn find(&self, name: &str) -> Result<Option<Note>> {
        if !self.is_safe_name(name) {
            return Err(JotError::UnsafeName(name.to_string()));
        }

        let resolution = self.index.resolve(name);
        if resolution.evicted {
            self.cache.remove(name);
        }
        let Some(location) = resolution.location else {
            return Ok(None);
        };

        match Self::read_note(&location.path, name, &location.date_dir, location.tier) {
            Ok(note) => Ok(Some(note)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JotError::Io(e)),
        }
    }

    fn list_active(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        let mut evicted = false;

        for (name, date_dir) in self.index.entries() {
            let path = self.index.active_path(&date_dir, &name);
            match Self::read_note(&path, &name, &date_dir, Tier::Active) {
                Ok(note) => notes.push(note),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    if self.index.remove_if_in(&name, &date_dir) {
                        self.cache.remove(&name);
                        evicted = true;
                    }
                }
                Err(e) => warn!(note = %name, error = %e, "skipping unreadable note"),
            }
        }

        if evicted {
            self.index.persist()?;
        }
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    fn list_backup(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();

        for date_dir in date_partitions(&self.backup_root)?.into_iter().rev() {
            let dir = self.backup_root.join(&date_dir);
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(partition = %date_dir, error = %e, "skipping unreadable backup partition");
                    continue;
                }
            };

            let mut partition = Vec::new();
            for entry in entries.flatten() {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if !self.is_safe_name(&name) {
                    continue;
                }
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                match Self::read_note(&path, &name, &date_dir, Tier::Backup) {
                    Ok(note) => partition.push(note),
                    Err(e) => warn!(note = %name, error = %e, "skipping unreadable backup note"),
                }
            }
            partition.sort_by(|a, b| a.name.cmp(&b.name));
            notes.extend(partition);
        }

        Ok(notes)
    }

    fn move_stale(&self, cutoff: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for date_dir in date_partitions(&self.active_root)? {
            if let Err(e) = self.sweep_partition(&date_dir, cutoff, &mut report) {
                warn!(partition = %date_dir, error = %e, "failed to sweep partition");
                report.failures.push(format!("{}: {}", date_dir, e));
            }
        }
        self.sweep_loose_files(cutoff, &mut report);

        if report.notes_moved > 0 || report.partitions_moved > 0 || report.partitions_merged > 0 {
            self.index.persist()?;
        }

        if !report.is_empty() {
            info!(
                partitions = report.partitions_moved + report.partitions_merged,
                notes = report.notes_moved,
                legacy = report.legacy_moved,
                failures = report.failures.len(),
                "moved stale notes to backup"
            );
        }
        Ok(report)
    }

    fn doctor(&self) -> Result<DoctorReport> {
        let mut report = DoctorReport::default();

        for file in self.loose_files().map_err(JotError::Io)? {
            let date_dir = date_dir_for(file.modified);
            let dir = self.active_root.join(&date_dir);
            let target = dir.join(&file.name);
            if target.exists() {
                warn!(note = %file.name, partition = %date_dir, "legacy note collides with partitioned note, leaving it");
                continue;
            }
            fs::create_dir_all(&dir).map_err(JotError::Io)?;
            fs::rename(&file.path, &target).map_err(JotError::Io)?;
            report.migrated_legacy += 1;
        }

        let before: HashSet<String> = self.index.names().into_iter().collect();
        report.indexed_notes = self.index.rebuild()?;
        let after: HashSet<String> = self.index.names().into_iter().collect();

        for gone in before.difference(&after) {
            self.cache.remove(gone);
            report.evicted_entries += 1;
        }
        report.recovered_notes = after.difference(&before).count();
        self.cache.extend(after);

        if !report.is_clean() {
            info!(
                migrated = report.migrated_legacy,
                evicted = report.evicted_entries,
                recovered = report.recovered_notes,
                "repaired note store"
            );
        }
        Ok(report)
    }

    fn active_size(&self) -> Result<u64> {
        if !self.active_root.exists() {
            return Ok(0);
        }

        let mut total = 0;
        let walker = WalkDir::new(&self.active_root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry.map_err(|e| JotError::Store(e.to_string()))?;
            if entry.file_type().is_file() && entry.file_name() != INDEX_FILE_NAME {
                total += entry
                    .metadata()
                    .map_err(|e| JotError::Store(e.to_string()))?
                    .len();
            }
        }
        Ok(total)
    }

    fn active_count(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Hub;
    use crate::clock::FixedClock;
    use chrono::{Duration, Local, TimeZone};
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn setup() -> (TempDir, FileStore, Arc<FixedClock>) {
        let tmp = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::new(at(2024, 3, 1)));
        let store = FileStore::open(StoreOptions::new(
            tmp.path().join("notes"),
            tmp.path().join("backup"),
        ))
        .unwrap()
        .with_clock(clock.clone());
        (tmp, store, clock)
    }

    #[test]
    fn save_writes_into_todays_partition() {
        let (_tmp, store, _clock) = setup();
        store.save("abc", "hello").unwrap();

        let path = store.active_root().join("20240301").join("abc");
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
        assert_eq!(store.index().get("abc").as_deref(), Some("20240301"));
        assert!(store.exists("abc"));
    }

    #[test]
    fn save_relocates_note_to_new_partition() {
        let (_tmp, store, clock) = setup();
        store.save("abc", "one").unwrap();
        clock.advance(Duration::days(1));
        store.save("abc", "two").unwrap();

        assert!(!store.active_root().join("20240301").join("abc").exists());
        assert_eq!(
            fs::read_to_string(store.active_root().join("20240302").join("abc")).unwrap(),
            "two"
        );
        assert_eq!(store.index().get("abc").as_deref(), Some("20240302"));
    }

    #[test]
    fn save_rejects_unsafe_name() {
        let (_tmp, store, _clock) = setup();
        assert!(matches!(
            store.save("../x", "nope"),
            Err(JotError::UnsafeName(_))
        ));
        assert!(matches!(store.load("a/b"), Err(JotError::UnsafeName(_))));
        // "." would resolve to the partition directory itself.
        assert!(matches!(
            store.save(".", "nope"),
            Err(JotError::UnsafeName(_))
        ));
        assert!(!store.exists("."));
    }

    #[test]
    fn empty_save_deletes() {
        let (_tmp, store, _clock) = setup();
        store.save("abc", "hello").unwrap();
        store.save("abc", "").unwrap();

        assert_eq!(store.load("abc").unwrap(), "");
        assert!(!store.exists("abc"));
        assert!(store.index().get("abc").is_none());
        assert!(store.list_active().unwrap().is_empty());
    }

    #[test]
    fn note_locks_are_released_after_save_and_delete() {
        let (_tmp, store, _clock) = setup();
        for i in 0..200 {
            let name = format!("n{}", i);
            store.save(&name, "x").unwrap();
            store.save(&name, "").unwrap();
        }
        assert_eq!(store.active_count(), 0);
        assert_eq!(store.pending_note_locks(), 0);
    }

    #[test]
    fn note_locks_drain_after_contended_saves() {
        let (_tmp, store, _clock) = setup();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.save("shared", &format!("writer {}", i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.pending_note_locks(), 0);
        assert!(store.load("shared").unwrap().starts_with("writer "));
    }

    #[test]
    fn staging_leaves_no_residue() {
        let (_tmp, store, _clock) = setup();
        store.save("abc", "hello").unwrap();
        let staged: Vec<_> = fs::read_dir(store.active_root().join(STAGING_DIR))
            .unwrap()
            .collect();
        assert!(staged.is_empty());
    }

    #[test]
    fn load_falls_back_to_backup() {
        let (_tmp, store, _clock) = setup();
        let dir = store.backup_root().join("20230101");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("old"), "archived").unwrap();

        assert_eq!(store.load("old").unwrap(), "archived");
        let note = store.find("old").unwrap().unwrap();
        assert!(note.is_backup);
        assert_eq!(note.date_dir, "20230101");
        assert!(!store.exists("old"));
    }

    #[test]
    fn list_active_evicts_vanished_notes() {
        let (_tmp, store, _clock) = setup();
        store.save("keep", "a").unwrap();
        store.save("gone", "b").unwrap();
        fs::remove_file(store.active_root().join("20240301").join("gone")).unwrap();

        let notes = store.list_active().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].name, "keep");
        assert!(!store.exists("gone"));
        assert!(store.index().get("gone").is_none());
    }

    #[test]
    fn list_backup_orders_by_partition_then_name() {
        let (_tmp, store, _clock) = setup();
        for (dir, name) in [("20230101", "b"), ("20230101", "a"), ("20230301", "c")] {
            let path = store.backup_root().join(dir);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join(name), name).unwrap();
        }

        let names: Vec<_> = store
            .list_backup()
            .unwrap()
            .into_iter()
            .map(|n| format!("{}/{}", n.date_dir, n.name))
            .collect();
        assert_eq!(names, vec!["20230301/c", "20230101/a", "20230101/b"]);
    }

    #[test]
    fn generated_names_are_reserved() {
        let (_tmp, store, _clock) = setup();
        let name = store.generate_name().unwrap();
        assert_eq!(name.len(), 3);
        assert!(store.exists(&name));
        assert_eq!(store.load(&name).unwrap(), "");
    }

    #[test]
    fn reopen_seeds_cache_from_index() {
        let (tmp, store, _clock) = setup();
        store.save("abc", "x").unwrap();
        drop(store);

        let reopened = FileStore::open(StoreOptions::new(
            tmp.path().join("notes"),
            tmp.path().join("backup"),
        ))
        .unwrap();
        assert!(reopened.exists("abc"));
        assert_eq!(reopened.load("abc").unwrap(), "x");
    }

    #[test]
    fn active_size_counts_only_notes() {
        let (_tmp, store, _clock) = setup();
        store.save("a", "1234").unwrap();
        store.save("b", "56").unwrap();
        assert_eq!(store.active_size().unwrap(), 6);
        assert_eq!(store.active_count(), 2);
    }

    #[test]
    fn save_broadcasts_new_content() {
        let tmp = TempDir::new().unwrap();
        let hub = Arc::new(Hub::new());
        let store = FileStore::open(StoreOptions::new(
            tmp.path().join("notes"),
            tmp.path().join("backup"),
        ))
        .unwrap()
        .with_broadcaster(hub.clone());

        let updates = hub.subscribe("abc");
        store.save("abc", "first").unwrap();
        store.save("abc", "").unwrap();

        assert_eq!(updates.try_recv().unwrap().content(), "first");
        assert_eq!(updates.try_recv().unwrap().content(), "");
    }

    #[test]
    fn doctor_migrates_loose_files_and_recovers_orphans() {
        let (_tmp, store, _clock) = setup();
        store.save("known", "x").unwrap();
        fs::write(store.active_root().join("legacy"), "old layout").unwrap();
        let orphan_dir = store.active_root().join("20240215");
        fs::create_dir_all(&orphan_dir).unwrap();
        fs::write(orphan_dir.join("orphan"), "no index").unwrap();
        store.index().put("ghost", "20240101");

        let report = store.doctor().unwrap();
        assert_eq!(report.migrated_legacy, 1);
        assert_eq!(report.evicted_entries, 1);
        assert_eq!(report.recovered_notes, 2);
        assert_eq!(report.indexed_notes, 3);

        assert!(store.exists("legacy"));
        assert!(store.exists("orphan"));
        assert!(!store.exists("ghost"));
        assert_eq!(store.load("legacy").unwrap(), "old layout");
        assert!(!store.active_root().join("legacy").exists());
    }
}
