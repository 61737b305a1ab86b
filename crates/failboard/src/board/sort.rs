//! Sort engine: stable ordering of a job subset by one field.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::job::{Job, TextField};

/// Sortable job attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Application,
    SubApplication,
    Folder,
    OrderDate,
    StartTime,
    EndTime,
    /// Derived triage ordinal: failed < being checked < fixed.
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::OrderDate,
            direction: SortDirection::Descending,
        }
    }
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the active field flips direction; another field starts ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Ascending comparison for this spec's field.
    fn compare_ascending(&self, a: &Job, b: &Job) -> Ordering {
        match self.field {
            SortField::Name => compare_text(TextField::Name, a, b),
            SortField::Application => compare_text(TextField::Application, a, b),
            SortField::SubApplication => compare_text(TextField::SubApplication, a, b),
            SortField::Folder => compare_text(TextField::Folder, a, b),
            SortField::OrderDate => compare_time(a.order_date, b.order_date),
            SortField::StartTime => compare_time(a.start_time, b.start_time),
            SortField::EndTime => compare_time(a.end_time, b.end_time),
            SortField::Status => a.triage_state().cmp(&b.triage_state()),
        }
    }

    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        let ordering = self.compare_ascending(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Base letters only: canonical decomposition with combining marks dropped,
/// then lowercased. "Étl" and "etl" share a key.
fn primary_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Collation in three levels: base letters, then accents, then case with
/// lowercase first.
fn compare_text(field: TextField, a: &Job, b: &Job) -> Ordering {
    let left = field.get(a).unwrap_or("");
    let right = field.get(b).unwrap_or("");
    primary_key(left)
        .cmp(&primary_key(right))
        .then_with(|| left.to_lowercase().nfd().cmp(right.to_lowercase().nfd()))
        .then_with(|| right.cmp(left))
}

fn compare_time(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    a.unwrap_or(epoch).cmp(&b.unwrap_or(epoch))
}

/// Returns `jobs` ordered by `spec`. Ties keep their input order.
pub fn sort_jobs(jobs: &[Job], spec: &SortSpec) -> Vec<Job> {
    let mut sorted = jobs.to_vec();
    sorted.sort_by(|a, b| spec.compare(a, b));
    sorted
}
