//! Job records as delivered by the collector, plus operator triage state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status reported by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    Waiting,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Waiting => write!(f, "waiting"),
        }
    }
}

/// Triage position of a job, derived from its flags.
///
/// Ordered so that ascending sorts put untouched failures first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageState {
    Failed,
    BeingChecked,
    Fixed,
}

impl TriageState {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TriageState::Failed => "Failed",
            TriageState::BeingChecked => "Being checked",
            TriageState::Fixed => "Fixed",
        }
    }
}

impl std::fmt::Display for TriageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive string fields used for filtering, sorting and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Name,
    Application,
    SubApplication,
    Folder,
}

impl TextField {
    pub const ALL: [TextField; 4] = [
        TextField::Name,
        TextField::Application,
        TextField::SubApplication,
        TextField::Folder,
    ];

    pub fn get(self, job: &Job) -> Option<&str> {
        match self {
            TextField::Name => job.name.as_deref(),
            TextField::Application => job.application.as_deref(),
            TextField::SubApplication => job.sub_application.as_deref(),
            TextField::Folder => job.folder.as_deref(),
        }
    }
}

/// One observed execution attempt of a scheduled unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique, immutable identifier.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
    /// Present only for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub is_being_checked: bool,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
}

impl Job {
    /// Creates a job with only identity and status set.
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            name: None,
            application: None,
            sub_application: None,
            folder: None,
            status,
            start_time: None,
            end_time: None,
            order_date: None,
            error_message: None,
            is_being_checked: false,
            is_fixed: false,
            checked_by: None,
            fixed_by: None,
            comment: None,
            solution: None,
        }
    }

    /// Timestamp used by date filters: the order date, else the start time.
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        self.order_date.or(self.start_time)
    }

    pub fn triage_state(&self) -> TriageState {
        if self.is_fixed {
            TriageState::Fixed
        } else if self.is_being_checked {
            TriageState::BeingChecked
        } else {
            TriageState::Failed
        }
    }

    /// Returns true if any operator-owned field is set.
    pub fn has_triage(&self) -> bool {
        self.is_being_checked
            || self.is_fixed
            || self.checked_by.is_some()
            || self.fixed_by.is_some()
            || self.comment.is_some()
            || self.solution.is_some()
    }

    /// Copies operator-owned fields from `previous`.
    pub fn inherit_triage(&mut self, previous: &Job) {
        self.is_being_checked = previous.is_being_checked;
        self.is_fixed = previous.is_fixed;
        self.checked_by = previous.checked_by.clone();
        self.fixed_by = previous.fixed_by.clone();
        self.comment = previous.comment.clone();
        self.solution = previous.solution.clone();
    }
}
