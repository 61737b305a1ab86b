//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use failboard::broadcast::Notifier;
use failboard::{DashboardState, Job, JobStatus, SnapshotPolicy};

/// Builder for creating `Job` instances.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    /// A failed job with no descriptive fields.
    pub fn failed(id: &str) -> Self {
        Self {
            job: Job::new(id, JobStatus::Failed),
        }
    }

    pub fn with_status(id: &str, status: JobStatus) -> Self {
        Self {
            job: Job::new(id, status),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.job.name = Some(name.to_string());
        self
    }

    pub fn application(mut self, application: &str) -> Self {
        self.job.application = Some(application.to_string());
        self
    }

    pub fn sub_application(mut self, sub_application: &str) -> Self {
        self.job.sub_application = Some(sub_application.to_string());
        self
    }

    pub fn folder(mut self, folder: &str) -> Self {
        self.job.folder = Some(folder.to_string());
        self
    }

    /// Order date at 06:00 UTC on the given day.
    pub fn ordered_on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.job.order_date = Some(utc(year, month, day, 6, 0));
        self
    }

    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.job.start_time = Some(at);
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.job.error_message = Some(message.to_string());
        self
    }

    pub fn being_checked_by(mut self, who: &str) -> Self {
        self.job.is_being_checked = true;
        self.job.checked_by = Some(who.to_string());
        self
    }

    pub fn fixed_by(mut self, who: &str) -> Self {
        self.job.is_fixed = true;
        self.job.fixed_by = Some(who.to_string());
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test timestamp")
}

/// A UTC dashboard for `operator` with its notifier.
pub fn dashboard(operator: &str, policy: SnapshotPolicy) -> (DashboardState<Utc>, Notifier) {
    let notifier = Notifier::new(64);
    let state = DashboardState::with_timezone(operator, policy, notifier.clone(), Utc);
    (state, notifier)
}

/// Applies `jobs` as a fresh snapshot.
pub fn load(state: &mut DashboardState<Utc>, jobs: Vec<Job>) {
    let ticket = state.begin_poll();
    state
        .apply_snapshot(ticket, jobs)
        .expect("snapshot with the latest ticket applies");
}

pub fn visible_ids(state: &DashboardState<Utc>) -> Vec<String> {
    state.visible().iter().map(|j| j.id.clone()).collect()
}
