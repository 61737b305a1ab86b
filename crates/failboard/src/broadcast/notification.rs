//! Notification broadcaster for user-visible occurrences.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::job::{Job, TriageState};

/// Kind of user-visible occurrence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    NewFailedJob,
    StatusChanged,
    CommentSaved,
    PollError,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::NewFailedJob => write!(f, "new-failed-job"),
            NotificationKind::StatusChanged => write!(f, "status-changed"),
            NotificationKind::CommentSaved => write!(f, "comment-saved"),
            NotificationKind::PollError => write!(f, "poll-error"),
        }
    }
}

/// Which annotation a save touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Comment,
    Solution,
}

impl Annotation {
    fn label(self) -> &'static str {
        match self {
            Annotation::Comment => "Comment",
            Annotation::Solution => "Solution",
        }
    }
}

/// Structured event for a presentation layer to render as a toast or alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    /// What the notification is about (a job name, an id list, an endpoint).
    pub subject: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, subject: &str, detail: &str) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            detail: detail.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn new_failed_job(job: &Job) -> Self {
        let subject = job.name.as_deref().unwrap_or(&job.id);
        let detail = match &job.error_message {
            Some(error) => format!("Job {} failed: {}", job.id, error),
            None => format!("Job {} failed", job.id),
        };
        Self::new(NotificationKind::NewFailedJob, subject, &detail)
    }

    pub fn status_changed(ids: &[String], state: TriageState, operator: &str) -> Self {
        let detail = format!(
            "{} job(s) marked as {} by {}",
            ids.len(),
            state.label().to_lowercase(),
            operator
        );
        Self::new(NotificationKind::StatusChanged, &ids.join(", "), &detail)
    }

    pub fn annotation_saved(ids: &[String], annotation: Annotation) -> Self {
        let detail = format!("{} saved for {} job(s)", annotation.label(), ids.len());
        Self::new(NotificationKind::CommentSaved, &ids.join(", "), &detail)
    }

    pub fn poll_error(endpoint: &str, error: &str) -> Self {
        Self::new(NotificationKind::PollError, endpoint, error)
    }
}

/// Broadcasts notifications to any number of subscribers.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<broadcast::Sender<Notification>>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, notification: Notification) {
        log::debug!(
            "Notification {}: {} ({})",
            notification.kind,
            notification.subject,
            notification.detail
        );
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}
