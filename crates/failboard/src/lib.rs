//! State core for a failed-batch-job triage dashboard.
//!
//! Polls a job collector, keeps an in-memory repository of jobs, and exposes
//! the filtered, sorted view plus the operator actions (check, fix, annotate,
//! bulk edit) to whatever presentation layer sits on top.

pub mod board;
pub mod broadcast;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod job;
pub mod poller;
pub mod sanitize;
pub mod secrets;
pub mod telemetry;

pub use board::{
    Activation, DashboardState, DateScope, FilterCriteria, JobRepository, SnapshotPolicy,
    SortDirection, SortField, SortSpec,
};
pub use broadcast::{Notification, NotificationKind, Notifier};
pub use collector::{CollectorClient, JobSource, PollError};
pub use config::{load_config, DashboardConfig};
pub use error::{ConfigError, FailboardError, Result};
pub use export::{export_rows, to_csv, ExportRow};
pub use job::{Job, JobStatus, TextField, TriageState};
pub use poller::{poll_once, Poller, SharedState};
pub use secrets::{ApiKeySource, SecretError};
