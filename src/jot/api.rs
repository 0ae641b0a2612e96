//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the single
//! entry point for every UI (the bundled CLI, or a web front end wiring the
//! same calls to HTTP routes).
//!
//! It dispatches to `commands/*.rs`, normalizes inputs, and owns the shared
//! pieces the commands need: the store, the live limits, the clock and the
//! effective configuration. It does no I/O of its own beyond persisting limit
//! changes through the config command.
//!
//! ## Generic Over NoteStore
//!
//! `JotApi<S: NoteStore>` is generic over the storage backend:
//! - Production: `JotApi<FileStore>`
//! - Testing: `JotApi<InMemoryStore>`
//!
//! The store sits behind an `Arc` so the background [`Sweeper`] can share it.

use crate::clock::{Clock, SystemClock};
use crate::commands;
use crate::config::JotConfig;
use crate::error::Result;
use crate::limits::Limits;
use crate::model::Tier;
use crate::store::fs::{FileStore, StoreOptions};
use crate::store::NoteStore;
use crate::sweep::{SweepSchedule, Sweeper, SweeperHandle};
use std::path::Path;
use std::sync::Arc;

pub struct JotApi<S: NoteStore> {
    store: Arc<S>,
    limits: Arc<Limits>,
    clock: Arc<dyn Clock>,
    config: JotConfig,
    paths: commands::JotPaths,
}

impl JotApi<FileStore> {
    /// Opens the file-backed store under `home` using `home/config.json`.
    pub fn open(home: &Path) -> Result<Self> {
        let config = JotConfig::load(home)?;
        let store = FileStore::open(StoreOptions::from_config(&config, home))?;
        let paths = commands::JotPaths {
            home: home.to_path_buf(),
        };
        Ok(Self::new(Arc::new(store), config, paths))
    }
}

impl<S: NoteStore> JotApi<S> {
    pub fn new(store: Arc<S>, config: JotConfig, paths: commands::JotPaths) -> Self {
        Self {
            store,
            limits: Arc::new(Limits::from_config(&config)),
            clock: Arc::new(SystemClock),
            config,
            paths,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn limits_handle(&self) -> &Arc<Limits> {
        &self.limits
    }

    pub fn paths(&self) -> &commands::JotPaths {
        &self.paths
    }

    pub fn new_note(&self) -> Result<commands::CmdResult> {
        commands::new::run(self.store.as_ref())
    }

    pub fn save_note(
        &self,
        name: &str,
        content: &str,
        token: Option<&str>,
        lock: LockChange,
    ) -> Result<commands::CmdResult> {
        commands::save::run(
            self.store.as_ref(),
            &self.limits,
            name,
            content,
            token,
            lock,
        )
    }

    pub fn delete_note(&self, name: &str, token: Option<&str>) -> Result<commands::CmdResult> {
        commands::delete::run(self.store.as_ref(), name, token)
    }

    pub fn view_note(
        &self,
        name: &str,
        token: Option<&str>,
        raw: bool,
    ) -> Result<commands::CmdResult> {
        commands::view::run(self.store.as_ref(), name, token, raw)
    }

    pub fn lock_note(
        &self,
        name: &str,
        token: &str,
        current_token: Option<&str>,
    ) -> Result<commands::CmdResult> {
        commands::lock::lock(
            self.store.as_ref(),
            &self.limits,
            name,
            token,
            current_token,
        )
    }

    pub fn unlock_note(&self, name: &str, token: &str) -> Result<commands::CmdResult> {
        commands::lock::unlock(self.store.as_ref(), name, token)
    }

    pub fn list_notes(&self, tier: Tier) -> Result<commands::CmdResult> {
        commands::list::run(self.store.as_ref(), tier)
    }

    /// Sweeps once. `days` overrides the configured inactivity window.
    pub fn sweep(&self, days: Option<u32>) -> Result<commands::CmdResult> {
        let days = days.unwrap_or(self.config.backup_days);
        commands::sweep::run(
            self.store.as_ref(),
            self.clock.as_ref(),
            chrono::Duration::days(days as i64),
        )
    }

    pub fn doctor(&self) -> Result<commands::CmdResult> {
        commands::doctor::run(self.store.as_ref())
    }

    pub fn stats(&self) -> Result<commands::CmdResult> {
        commands::stats::run(self.store.as_ref(), &self.limits)
    }

    pub fn limits(&mut self, update: LimitsUpdate) -> Result<commands::CmdResult> {
        commands::limits::run(&self.limits, update, &mut self.config, &self.paths)
    }

    pub fn config(&self) -> Result<commands::CmdResult> {
        commands::config::run(&self.config, &self.paths)
    }

    /// The configured sweep schedule, for [`JotApi::spawn_sweeper`].
    pub fn sweep_schedule(&self) -> SweepSchedule {
        SweepSchedule::from_config(&self.config)
    }
}

impl<S: NoteStore + 'static> JotApi<S> {
    /// Starts the background sweeper on the shared store.
    pub fn spawn_sweeper(&self, schedule: SweepSchedule) -> Result<SweeperHandle> {
        Sweeper::spawn(Arc::clone(&self.store), Arc::clone(&self.clock), schedule)
    }
}

pub use crate::commands::limits::LimitsUpdate;
pub use crate::commands::save::LockChange;
pub use commands::{CmdMessage, CmdResult, JotPaths, LimitsView, MessageLevel, Stats};
