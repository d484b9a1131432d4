// File: src/executor.rs
//! End-to-end print job runner.
//!
//! One job is the strictly sequential pipeline fetch -> format -> emit.
//! The runner owns a single-permit guard; a trigger arriving while a job is
//! active is rejected with a "busy" outcome, never queued. Queue depth is
//! zero. The guard is held across the whole pipeline, so the output device
//! is never written by two jobs at once.

use crate::client::{EventSource, TaskSource};
use crate::config::Config;
use crate::model::{Event, JobOutcome, TaskItem};
use crate::printer::ReportSink;
use crate::render::render;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};

/// Runs fetch->format->emit jobs, one at a time.
///
/// All collaborators are held behind trait objects so tests can substitute
/// fake sources and sinks. Outcomes are returned to the caller and, when a
/// sender is provided, also delivered to a passive subscriber (log panel,
/// daemon console).
pub struct JobRunner {
    events: Arc<dyn EventSource>,
    tasks: Arc<dyn TaskSource>,
    printer: Arc<dyn ReportSink>,
    fallback: Arc<dyn ReportSink>,
    config: Arc<RwLock<Config>>,
    outcomes: Option<mpsc::Sender<JobOutcome>>,
    busy: Mutex<()>,
}

impl JobRunner {
    pub fn new(
        events: Arc<dyn EventSource>,
        tasks: Arc<dyn TaskSource>,
        printer: Arc<dyn ReportSink>,
        fallback: Arc<dyn ReportSink>,
        config: Arc<RwLock<Config>>,
        outcomes: Option<mpsc::Sender<JobOutcome>>,
    ) -> Self {
        Self {
            events,
            tasks,
            printer,
            fallback,
            config,
            outcomes,
            busy: Mutex::new(()),
        }
    }

    /// Run one job now. Returns the single outcome for this invocation and
    /// delivers it to the subscriber channel when one is configured.
    pub async fn run_once(&self) -> JobOutcome {
        // Zero queue depth: a colliding trigger is rejected immediately.
        let Ok(_guard) = self.busy.try_lock() else {
            let outcome = JobOutcome::failed("Busy: a print job is already running");
            self.deliver(&outcome).await;
            return outcome;
        };

        let outcome = self.execute().await;
        self.deliver(&outcome).await;
        outcome
    }

    async fn execute(&self) -> JobOutcome {
        let priorities = {
            let config = self.config.read().await;
            config.task_priorities.clone()
        };
        let today = Local::now().date_naive();
        let mut warnings: Vec<String> = Vec::new();

        // --- Fetch (both sources concurrently) ---
        log::debug!("Job: fetching sources");
        let (events_result, tasks_result) =
            tokio::join!(self.events.fetch_events(today), self.tasks.fetch_tasks());

        if events_result.is_err() && tasks_result.is_err() {
            // Nothing to print; this is the only fetch-stage failure mode.
            let msg = format!(
                "Fetch failed: events: {}; tasks: {}",
                events_result.unwrap_err(),
                tasks_result.unwrap_err()
            );
            return JobOutcome::failed(msg);
        }

        let events: Vec<Event> = match events_result {
            Ok(events) => events,
            Err(e) => {
                log::warn!("Calendar fetch failed, printing without events: {}", e);
                warnings.push(format!("events unavailable: {}", e));
                Vec::new()
            }
        };
        let tasks: Vec<TaskItem> = match tasks_result {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!("Task fetch failed, printing without tasks: {}", e);
                warnings.push(format!("tasks unavailable: {}", e));
                Vec::new()
            }
        };

        // --- Format (pure, cannot fail) ---
        log::debug!("Job: formatting report");
        let lines = render(today, &events, &tasks, &priorities);

        // --- Emit ---
        log::debug!("Job: emitting {} line(s)", lines.len());
        let summary = format!("events: {}, tasks: {}", events.len(), tasks.len());

        match self.printer.write_lines(&lines).await {
            Ok(()) => {}
            Err(device_err) => {
                log::warn!("Device emit failed: {}", device_err);
                // Same report, alternative sink. The job still counts as
                // "report produced" when the fallback takes it.
                if let Err(fallback_err) = self.fallback.write_lines(&lines).await {
                    return JobOutcome::failed(format!(
                        "Print failed: {}; console fallback failed: {}",
                        device_err, fallback_err
                    ));
                }
                warnings.push(format!(
                    "printer unavailable ({}), wrote report to console",
                    device_err
                ));
            }
        }

        if warnings.is_empty() {
            JobOutcome::ok(format!("Printed ({})", summary))
        } else {
            JobOutcome::ok(format!("Printed ({}; warning: {})", summary, warnings.join("; ")))
        }
    }

    async fn deliver(&self, outcome: &JobOutcome) {
        if outcome.success {
            log::info!("{}", outcome.message);
        } else {
            log::error!("{}", outcome.message);
        }
        if let Some(tx) = &self.outcomes {
            // A lagging subscriber must never stall the pipeline.
            let _ = tx.try_send(outcome.clone());
        }
    }
}
