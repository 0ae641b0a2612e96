//! In-memory [`NoteStore`] for command tests.
//!
//! Keeps the same tier semantics as the file store (today's partition on
//! save, newest backup partition wins on load) without touching disk.

use super::{DoctorReport, NoteStore, SweepReport};
use crate::broadcast::{Broadcaster, NoopBroadcaster};
use crate::cache::ExistenceCache;
use crate::clock::{Clock, SystemClock};
use crate::error::{JotError, Result};
use crate::model::{sort_newest_first, Note};
use crate::names::{self, NameGenerator};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

pub struct InMemoryStore {
    generator: NameGenerator,
    cache: ExistenceCache,
    max_name_len: usize,
    active: RwLock<HashMap<String, Note>>,
    /// Keyed by (partition, name) so iteration is in partition order.
    backup: RwLock<BTreeMap<(String, String), Note>>,
    clock: Arc<dyn Clock>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            generator: NameGenerator::default(),
            cache: ExistenceCache::new(),
            max_name_len: names::DEFAULT_MAX_PATH_LENGTH,
            active: RwLock::new(HashMap::new()),
            backup: RwLock::new(BTreeMap::new()),
            clock: Arc::new(SystemClock),
            broadcaster: Arc::new(NoopBroadcaster),
        }
    }

    pub fn with_generator(mut self, generator: NameGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// Places a note straight into the backup tier.
    pub fn insert_backup(&self, date_dir: &str, name: &str, content: &str) {
        let note = Note {
            name: name.to_string(),
            content: content.to_string(),
            updated_at: self.clock.now(),
            size: content.len() as u64,
            date_dir: date_dir.to_string(),
            is_backup: true,
        };
        self.backup
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((date_dir.to_string(), name.to_string()), note);
    }

    fn newest_backup(&self, name: &str) -> Option<Note> {
        self.backup
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|((_, n), _)| n == name)
            .map(|(_, note)| note.clone())
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if self.is_safe_name(name) {
            Ok(())
        } else {
            Err(JotError::UnsafeName(name.to_string()))
        }
    }
}

impl NoteStore for InMemoryStore {
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
        self.check_name(name)?;

        {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            if content.is_empty() {
                if active.remove(name).is_none() {
                    let mut backup = self.backup.write().unwrap_or_else(PoisonError::into_inner);
                    let newest = backup.keys().rev().find(|(_, n)| n == name).cloned();
                    if let Some(key) = newest {
                        backup.remove(&key);
                    }
                }
                self.cache.remove(name);
            } else {
                let now = self.clock.now();
                active.insert(
                    name.to_string(),
                    Note {
                        name: name.to_string(),
                        content: content.to_string(),
                        updated_at: now,
                        size: content.len() as u64,
                        date_dir: self.clock.today(),
                        is_backup: false,
                    },
                );
                self.cache.add(name);
            }
        }

        self.broadcaster.broadcast(name, content);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<String> {
        Ok(self
            .find(name)?
            .map(|note| note.content)
            .unwrap_or_default())
    }

    fn find(&self, name: &str) -> Result<Option<Note>> {
        self.check_name(name)?;
        let active = self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        Ok(active.or_else(|| self.newest_backup(name)))
    }

    fn list_active(&self) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    fn list_backup(&self) -> Result<Vec<Note>> {
        let backup = self.backup.read().unwrap_or_else(PoisonError::into_inner);
        let mut notes: Vec<Note> = backup.values().cloned().collect();
        notes.sort_by(|a, b| b.date_dir.cmp(&a.date_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(notes)
    }

    fn move_stale(&self, cutoff: DateTime<Utc>) -> Result<SweepReport> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let mut backup = self.backup.write().unwrap_or_else(PoisonError::into_inner);

        // A partition moves only when none of its notes is recent.
        let mut fresh: HashSet<String> = HashSet::new();
        for note in active.values() {
            if note.updated_at >= cutoff {
                fresh.insert(note.date_dir.clone());
            }
        }

        let stale: Vec<String> = active
            .values()
            .filter(|n| !fresh.contains(&n.date_dir))
            .map(|n| n.name.clone())
            .collect();

        let mut report = SweepReport::default();
        let mut partitions: HashSet<String> = HashSet::new();
        for name in stale {
            if let Some(mut note) = active.remove(&name) {
                self.cache.remove(&name);
                partitions.insert(note.date_dir.clone());
                note.is_backup = true;
                backup.insert((note.date_dir.clone(), name), note);
                report.notes_moved += 1;
            }
        }
        report.partitions_moved = partitions.len();
        Ok(report)
    }

    fn doctor(&self) -> Result<DoctorReport> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        let indexed: Vec<String> = active.keys().cloned().collect();
        let recovered = indexed.iter().filter(|n| !self.cache.exists(n)).count();
        self.cache.extend(indexed);
        Ok(DoctorReport {
            recovered_notes: recovered,
            indexed_notes: active.len(),
            ..DoctorReport::default()
        })
    }

    fn active_size(&self) -> Result<u64> {
        Ok(self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|n| n.size)
            .sum())
    }

    fn active_count(&self) -> usize {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
