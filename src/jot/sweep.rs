//! # Archival Sweep
//!
//! Moves notes nobody has touched for a while from the active tier to the
//! backup tier. The filesystem work lives in [`NoteStore::move_stale`]; this
//! module computes the cutoff and owns the background schedule.
//!
//! [`Sweeper::spawn`] runs one sweep immediately and then one per interval on
//! a dedicated thread. The returned [`SweeperHandle`] stops the thread on
//! [`SweeperHandle::stop`] or when dropped; a sweep in progress finishes
//! first.

use crate::clock::Clock;
use crate::config::JotConfig;
use crate::error::{JotError, Result};
use crate::store::{NoteStore, SweepReport};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_INACTIVITY_DAYS: u32 = 7;
pub const DEFAULT_INTERVAL_HOURS: u64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSchedule {
    /// Partitions idle for longer than this are moved.
    pub inactivity: chrono::Duration,
    /// Pause between sweeps.
    pub interval: Duration,
}

impl Default for SweepSchedule {
    fn default() -> Self {
        Self {
            inactivity: chrono::Duration::days(DEFAULT_INACTIVITY_DAYS as i64),
            interval: Duration::from_secs(DEFAULT_INTERVAL_HOURS * 3600),
        }
    }
}

impl SweepSchedule {
    pub fn from_config(config: &JotConfig) -> Self {
        Self {
            inactivity: chrono::Duration::days(config.backup_days as i64),
            interval: Duration::from_secs(config.sweep_interval_hours.max(1) * 3600),
        }
    }
}

pub fn cutoff(clock: &dyn Clock, inactivity: chrono::Duration) -> DateTime<Utc> {
    clock.now() - inactivity
}

/// Sweeps once with the cutoff `now - inactivity`.
pub fn run_once<S: NoteStore + ?Sized>(
    store: &S,
    clock: &dyn Clock,
    inactivity: chrono::Duration,
) -> Result<SweepReport> {
    let cutoff = cutoff(clock, inactivity);
    debug!(%cutoff, "sweeping stale partitions");
    store.move_stale(cutoff)
}

pub struct Sweeper;

impl Sweeper {
    pub fn spawn<S: NoteStore + ?Sized + 'static>(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        schedule: SweepSchedule,
    ) -> Result<SweeperHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let runs = Arc::new(AtomicUsize::new(0));
        let thread_runs = Arc::clone(&runs);

        let thread = thread::Builder::new()
            .name("jot-sweeper".to_string())
            .spawn(move || {
                info!(interval_secs = schedule.interval.as_secs(), "sweeper started");
                loop {
                    match run_once(store.as_ref(), clock.as_ref(), schedule.inactivity) {
                        Ok(report) if !report.failures.is_empty() => {
                            warn!(failures = report.failures.len(), "sweep finished with failures")
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "sweep failed"),
                    }
                    thread_runs.fetch_add(1, Ordering::SeqCst);

                    match stop_rx.recv_timeout(schedule.interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("sweeper stopped");
            })
            .map_err(JotError::Io)?;

        Ok(SweeperHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            runs,
        })
    }
}

pub struct SweeperHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    runs: Arc<AtomicUsize>,
}

impl SweeperHandle {
    /// Completed sweeps so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Signals the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("sweeper thread panicked");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::memory::InMemoryStore;
    use chrono::{Local, TimeZone};
    use std::time::Instant;

    fn clock() -> Arc<FixedClock> {
        let start = Local
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        Arc::new(FixedClock::new(start))
    }

    fn wait_for(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting for sweeper");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn run_once_uses_inactivity_window() {
        let clock = clock();
        let store = InMemoryStore::new().with_clock(clock.clone());
        store.save("abc", "x").unwrap();

        clock.advance(chrono::Duration::days(3));
        let report = run_once(&store, clock.as_ref(), chrono::Duration::days(7)).unwrap();
        assert!(report.is_empty());
        assert!(store.exists("abc"));

        clock.advance(chrono::Duration::days(5));
        let report = run_once(&store, clock.as_ref(), chrono::Duration::days(7)).unwrap();
        assert_eq!(report.notes_moved, 1);
        assert!(!store.exists("abc"));
    }

    #[test]
    fn sweeper_runs_immediately_and_repeats() {
        let clock = clock();
        let store = Arc::new(InMemoryStore::new().with_clock(clock.clone()));
        store.save("abc", "x").unwrap();
        clock.advance(chrono::Duration::days(8));

        let handle = Sweeper::spawn(
            store.clone(),
            clock,
            SweepSchedule {
                inactivity: chrono::Duration::days(7),
                interval: Duration::from_millis(10),
            },
        )
        .unwrap();

        wait_for(|| handle.runs() >= 2);
        handle.stop();
        assert!(!store.exists("abc"));
        assert_eq!(store.load("abc").unwrap(), "x");
    }

    #[test]
    fn stop_interrupts_a_long_interval() {
        let store = Arc::new(InMemoryStore::new());
        let handle = Sweeper::spawn(store, clock(), SweepSchedule::default()).unwrap();
        wait_for(|| handle.runs() >= 1);

        let started = Instant::now();
        handle.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn dropping_the_handle_stops_the_thread() {
        let store = Arc::new(InMemoryStore::new());
        let handle = Sweeper::spawn(store.clone(), clock(), SweepSchedule::default()).unwrap();
        wait_for(|| handle.runs() >= 1);
        drop(handle);
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[test]
    fn schedule_from_config() {
        let config = JotConfig {
            backup_days: 3,
            sweep_interval_hours: 2,
            ..JotConfig::default()
        };
        let schedule = SweepSchedule::from_config(&config);
        assert_eq!(schedule.inactivity, chrono::Duration::days(3));
        assert_eq!(schedule.interval, Duration::from_secs(7200));
    }
}
