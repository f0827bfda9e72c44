//! Daily jobs: reminders at their configured times and the end-of-day export.
//!
//! Times are local (the clock's UTC offset). The loop sleeps until the
//! earliest next occurrence, runs every job due at that instant, and repeats.
//! Job failures are logged; the loop never stops on them.

use crate::domain::MealSlot;
use crate::ports::Clock;
use crate::usecases::export_service::ExportService;
use crate::usecases::reminder_service::ReminderService;
use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Reminder(MealSlot),
    DailyExport,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Reminder(slot) => write!(f, "reminder:{}", slot),
            Job::DailyExport => f.write_str("daily-export"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledJob {
    pub at: NaiveTime,
    pub job: Job,
}

/// Next occurrence of `at` strictly after `now`.
pub fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Jobs due at the earliest upcoming instant after `after`, with that instant.
pub fn next_due(jobs: &[ScheduledJob], after: NaiveDateTime) -> Option<(NaiveDateTime, Vec<Job>)> {
    let earliest = jobs.iter().map(|j| next_run(after, j.at)).min()?;
    let due = jobs
        .iter()
        .filter(|j| next_run(after, j.at) == earliest)
        .map(|j| j.job)
        .collect();
    Some((earliest, due))
}

pub struct Scheduler {
    jobs: Vec<ScheduledJob>,
    clock: Arc<dyn Clock>,
    reminders: Arc<ReminderService>,
    export: Arc<ExportService>,
}

impl Scheduler {
    pub fn new(
        jobs: Vec<ScheduledJob>,
        clock: Arc<dyn Clock>,
        reminders: Arc<ReminderService>,
        export: Arc<ExportService>,
    ) -> Self {
        Self {
            jobs,
            clock,
            reminders,
            export,
        }
    }

    /// Run forever. Returns immediately when there are no jobs.
    pub async fn run(self) {
        if self.jobs.is_empty() {
            info!("no scheduled jobs");
            return;
        }
        info!(jobs = self.jobs.len(), "scheduler started");

        // Last fired instant; guards against running a job twice if the
        // clock reads slightly early after waking.
        let mut last_fired: Option<NaiveDateTime> = None;
        loop {
            let now = self.clock.now();
            let after = last_fired.map_or(now, |t| t.max(now));
            let Some((at, due)) = next_due(&self.jobs, after) else {
                return;
            };
            let wait = (at - now).to_std().unwrap_or(Duration::ZERO);
            info!(next = %at, wait_secs = wait.as_secs(), jobs = ?due, "sleeping until next job");
            tokio::time::sleep(wait).await;

            for job in due {
                self.run_job(job).await;
            }
            last_fired = Some(at);
        }
    }

    pub async fn run_job(&self, job: Job) {
        let result = match job {
            Job::Reminder(slot) => self.reminders.ping_missing(slot).await.map(|_| ()),
            Job::DailyExport => self.export.export_daily().await.map(|_| ()),
        };
        match result {
            Ok(()) => info!(job = %job, "job done"),
            Err(e) => warn!(job = %job, error = %e, "job failed"),
        }
    }
}
