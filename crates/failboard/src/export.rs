//! Spreadsheet export of job lists.
//!
//! This is the only place where missing values get a display fallback.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::job::{Job, TriageState};

pub const EXPORT_HEADERS: [&str; 14] = [
    "ID",
    "Name",
    "Application",
    "Sub-application",
    "Folder",
    "Status",
    "Triage",
    "Triage detail",
    "Order date",
    "Start",
    "End",
    "Error",
    "Comment",
    "Solution",
];

/// One exported line, every column already rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: String,
    pub name: String,
    pub application: String,
    pub sub_application: String,
    pub folder: String,
    pub status: String,
    pub triage: String,
    pub triage_detail: String,
    pub order_date: String,
    pub start: String,
    pub end: String,
    pub error: String,
    pub comment: String,
    pub solution: String,
}

impl ExportRow {
    pub fn from_job(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            name: text(&job.name),
            application: text(&job.application),
            sub_application: text(&job.sub_application),
            folder: text(&job.folder),
            status: job.status.to_string(),
            triage: job.triage_state().label().to_string(),
            triage_detail: triage_detail(job),
            order_date: timestamp(job.order_date),
            start: timestamp(job.start_time),
            end: timestamp(job.end_time),
            error: text(&job.error_message),
            comment: text(&job.comment),
            solution: text(&job.solution),
        }
    }

    /// Cells in [`EXPORT_HEADERS`] order.
    pub fn cells(&self) -> [&str; 14] {
        [
            &self.id,
            &self.name,
            &self.application,
            &self.sub_application,
            &self.folder,
            &self.status,
            &self.triage,
            &self.triage_detail,
            &self.order_date,
            &self.start,
            &self.end,
            &self.error,
            &self.comment,
            &self.solution,
        ]
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn triage_detail(job: &Job) -> String {
    match job.triage_state() {
        TriageState::Fixed => match &job.fixed_by {
            Some(who) => format!("Fixed by {}", who),
            None => String::new(),
        },
        TriageState::BeingChecked => match &job.checked_by {
            Some(who) => format!("Being checked by {}", who),
            None => String::new(),
        },
        TriageState::Failed => String::new(),
    }
}

pub fn export_rows(jobs: &[Job]) -> Vec<ExportRow> {
    jobs.iter().map(ExportRow::from_job).collect()
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

fn write_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push_str("\r\n");
}

/// Renders rows as CSV with a header line and CRLF record separators.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    write_record(&mut out, EXPORT_HEADERS);
    for row in rows {
        write_record(&mut out, row.cells());
    }
    out
}
