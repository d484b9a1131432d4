// File: src/scheduler.rs
//! Daily trigger scheduling.
//!
//! The scheduler polls wall-clock time on a coarse interval and fires the
//! job runner when a configured HH:MM trigger matches the current minute.
//! Each trigger fires at most once per calendar day: the table remembers
//! the last date it fired, and the date key resets the bookkeeping at local
//! midnight for free. Starting mid-day never retro-fires earlier triggers,
//! because only the current minute can ever match.

use crate::config::Config;
use crate::executor::JobRunner;
use chrono::{DateTime, Local, NaiveDate, Timelike};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Poll period. Sub-minute precision is not required; well under a minute
/// so no trigger minute is skipped.
const POLL_PERIOD: Duration = Duration::from_secs(20);

/// A configured time-of-day trigger. No date component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trigger {
    pub hour: u32,
    pub minute: u32,
}

impl Trigger {
    /// Parse "HH:MM". Returns None for anything else.
    pub fn parse(entry: &str) -> Option<Self> {
        let (h, m) = entry.trim().split_once(':')?;
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse, sort and de-duplicate trigger specs. Invalid entries are logged
/// and skipped; duplicates are harmless.
pub fn parse_triggers(entries: &[String]) -> Vec<Trigger> {
    let mut triggers: Vec<Trigger> = Vec::new();
    for entry in entries {
        match Trigger::parse(entry) {
            Some(t) => triggers.push(t),
            None => log::warn!("Ignoring invalid schedule entry '{}'", entry),
        }
    }
    triggers.sort();
    triggers.dedup();
    triggers
}

/// Per-trigger "already fired today" bookkeeping.
#[derive(Debug, Default)]
pub struct TriggerTable {
    last_fired: HashMap<Trigger, NaiveDate>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the triggers due at `now` that have not fired today yet, and
    /// mark them fired. Polling the same minute repeatedly fires at most
    /// once per trigger per day.
    pub fn due(&mut self, triggers: &[Trigger], now: DateTime<Local>) -> Vec<Trigger> {
        let today = now.date_naive();
        let mut fired = Vec::new();
        for trigger in triggers {
            if trigger.hour != now.hour() || trigger.minute != now.minute() {
                continue;
            }
            if self.last_fired.get(trigger) == Some(&today) {
                continue;
            }
            self.last_fired.insert(*trigger, today);
            fired.push(*trigger);
        }
        // Entries from previous days are dead weight once the day rolls over.
        self.last_fired.retain(|_, d| *d == today);
        fired
    }
}

/// Handle to the background scheduler loop.
///
/// Dropping the handle (or calling `stop`) stops issuing new triggers; a
/// job already in flight always runs to completion.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn stop(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn stop_and_join(self) {
        self.stop();
        let _ = self.join.await;
    }
}

/// Spawn the scheduler loop. The trigger list is re-read from the shared
/// config on every poll, so edits take effect without a restart.
pub fn spawn(runner: Arc<JobRunner>, config: Arc<RwLock<Config>>) -> SchedulerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let join = tokio::spawn(async move {
        let mut table = TriggerTable::new();
        let mut ticker = tokio::time::interval(POLL_PERIOD);
        log::info!("Scheduler started");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let triggers = {
                        let config = config.read().await;
                        parse_triggers(&config.schedules)
                    };
                    for trigger in table.due(&triggers, Local::now()) {
                        log::info!("Trigger {} fired", trigger);
                        // Collisions coalesce through the runner's busy guard.
                        runner.run_once().await;
                    }
                }
            }
        }
        log::info!("Scheduler stopped");
    });

    SchedulerHandle { shutdown_tx, join }
}
