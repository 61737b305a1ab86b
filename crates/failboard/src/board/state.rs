//! The dashboard state record.
//!
//! Every poll result and operator action is a method here, and every method
//! that can change what the operator sees ends by recomputing the projection.

use std::collections::HashSet;

use chrono::{Local, NaiveDate, TimeZone, Utc};

use crate::board::filter::FilterCriteria;
use crate::board::mutation::{self, MutationOutcome, MutationTarget};
use crate::board::projection::project;
use crate::board::repository::{JobRepository, MergeOutcome, SnapshotPolicy};
use crate::board::selection::{Activation, BulkDraft, SelectionTracker};
use crate::board::sort::{SortField, SortSpec};
use crate::board::summary::{group_jobs, JobGroup, JobStats};
use crate::broadcast::{Annotation, Notification, Notifier};
use crate::collector::PollError;
use crate::export::{export_rows, ExportRow};
use crate::job::{Job, JobStatus, TextField, TriageState};

/// Sequence number handed out when a poll starts.
///
/// Only [`DashboardState::begin_poll`] creates tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollTicket(u64);

impl PollTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What applying a snapshot changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub jobs: usize,
    /// Failed jobs not known before this snapshot.
    pub new_failed: Vec<String>,
    /// Selected ids dropped because they vanished.
    pub pruned_selection: usize,
}

/// Everything the operator sees and acts on: known jobs, filter and sort
/// settings, the selection with its bulk draft, the open detail job and the
/// derived view.
///
/// `Tz` sets the day boundaries used by date filters.
pub struct DashboardState<Tz: TimeZone = Local> {
    repository: JobRepository,
    criteria: FilterCriteria,
    sort: SortSpec,
    selection: SelectionTracker,
    open_job: Option<String>,
    operator: String,
    notifier: Notifier,
    tz: Tz,
    today_override: Option<NaiveDate>,
    issued: u64,
    applied: u64,
    seeded: bool,
    view: Vec<Job>,
}

impl DashboardState<Local> {
    pub fn new(operator: &str, policy: SnapshotPolicy, notifier: Notifier) -> Self {
        Self::with_timezone(operator, policy, notifier, Local)
    }
}

impl<Tz: TimeZone> DashboardState<Tz> {
    /// Creates a state whose date filters use day boundaries in `tz`.
    pub fn with_timezone(
        operator: &str,
        policy: SnapshotPolicy,
        notifier: Notifier,
        tz: Tz,
    ) -> Self {
        Self {
            repository: JobRepository::new(policy),
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            selection: SelectionTracker::new(),
            open_job: None,
            operator: operator.to_string(),
            notifier,
            tz,
            today_override: None,
            issued: 0,
            applied: 0,
            seeded: false,
            view: Vec::new(),
        }
    }

    // ─── Derived view ───────────────────────────────────────────────────

    /// The current day in the state's zone, unless pinned.
    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz).date_naive())
    }

    /// Pins "today" for date filters; `None` follows the clock again.
    pub fn set_today(&mut self, today: Option<NaiveDate>) {
        self.today_override = today;
        self.recompute();
    }

    fn recompute(&mut self) {
        let today = self.today();
        self.view = project(self.repository.all(), &self.criteria, &self.sort, today, &self.tz);
    }

    /// Recomputes the projection against the current clock, e.g. after midnight.
    pub fn refresh_view(&mut self) {
        self.recompute();
    }

    /// The filtered and sorted list presented to the operator.
    pub fn visible(&self) -> &[Job] {
        &self.view
    }

    pub fn groups(&self, field: TextField) -> Vec<JobGroup> {
        group_jobs(&self.view, field)
    }

    /// Counts over every known job, not only the visible ones.
    pub fn stats(&self) -> JobStats {
        JobStats::from_jobs(self.repository.all())
    }

    /// Export rows for the visible list, in display order.
    pub fn export_visible(&self) -> Vec<ExportRow> {
        export_rows(&self.view)
    }

    pub fn repository(&self) -> &JobRepository {
        &self.repository
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn draft(&self) -> &BulkDraft {
        self.selection.draft()
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn open_job(&self) -> Option<&Job> {
        self.open_job.as_deref().and_then(|id| self.repository.get(id))
    }

    // ─── Snapshots ──────────────────────────────────────────────────────

    /// Starts a poll. Responses must be applied with the returned ticket.
    pub fn begin_poll(&mut self) -> PollTicket {
        self.issued += 1;
        PollTicket(self.issued)
    }

    /// Replaces the repository with a polled snapshot.
    ///
    /// A ticket not newer than the last applied one is rejected and leaves
    /// the state untouched. The first snapshot seeds the repository without
    /// announcing new failures.
    pub fn apply_snapshot(
        &mut self,
        ticket: PollTicket,
        jobs: Vec<Job>,
    ) -> Result<SnapshotReport, PollError> {
        if ticket.0 <= self.applied {
            return Err(PollError::StaleResponse {
                ticket: ticket.0,
                latest: self.applied,
            });
        }
        self.applied = ticket.0;

        let known: HashSet<String> = self.repository.ids().map(str::to_string).collect();
        self.repository.replace(jobs);

        let new_failed: Vec<String> = if self.seeded {
            self.repository
                .all()
                .iter()
                .filter(|job| job.status == JobStatus::Failed && !known.contains(&job.id))
                .map(|job| job.id.clone())
                .collect()
        } else {
            Vec::new()
        };
        self.seeded = true;

        for id in &new_failed {
            if let Some(job) = self.repository.get(id) {
                self.notifier.send(Notification::new_failed_job(job));
            }
        }

        let pruned_selection = self.after_repository_change();
        log::debug!(
            "Applied snapshot #{}: {} jobs, {} new failures",
            ticket.0,
            self.repository.len(),
            new_failed.len()
        );

        Ok(SnapshotReport {
            jobs: self.repository.len(),
            new_failed,
            pruned_selection,
        })
    }

    /// Records a failed poll. The snapshot is kept; a notification is emitted
    /// unless a newer poll has already been applied.
    pub fn record_poll_failure(&mut self, ticket: PollTicket, source: &str, error: &PollError) {
        if ticket.0 <= self.applied {
            log::debug!("Ignoring failure of superseded poll #{}: {}", ticket.0, error);
            return;
        }
        self.notifier
            .send(Notification::poll_error(source, &error.to_string()));
    }

    /// Adds or replaces a single job, e.g. a newly detected failure.
    pub fn merge_job(&mut self, job: Job) -> MergeOutcome {
        let announce = job.status == JobStatus::Failed && !self.repository.contains(&job.id);
        if announce {
            self.notifier.send(Notification::new_failed_job(&job));
        }

        let outcome = self.repository.merge(job);
        self.after_repository_change();
        outcome
    }

    fn after_repository_change(&mut self) -> usize {
        let pruned = self.selection.retain_present(&self.repository);
        if pruned > 0 {
            log::debug!("Pruned {} selected job(s) no longer present", pruned);
        }
        let open_vanished = self
            .open_job
            .as_deref()
            .is_some_and(|id| !self.repository.contains(id));
        if open_vanished {
            self.open_job = None;
        }
        self.recompute();
        pruned
    }

    // ─── Filter and sort ────────────────────────────────────────────────

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// Edits the criteria in place and recomputes once.
    pub fn update_criteria<F>(&mut self, f: F)
    where
        F: FnOnce(&mut FilterCriteria),
    {
        f(&mut self.criteria);
        self.recompute();
    }

    pub fn set_text_filter(&mut self, field: TextField, value: &str) {
        self.update_criteria(|c| c.text.set(field, value));
    }

    pub fn set_show_fixed(&mut self, show: bool) {
        self.update_criteria(|c| c.show_fixed = show);
    }

    pub fn set_today_only(&mut self, enabled: bool) {
        self.update_criteria(|c| c.set_today_only(enabled));
    }

    pub fn set_selected_date(&mut self, day: Option<NaiveDate>) {
        self.update_criteria(|c| c.set_selected_date(day));
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.recompute();
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
        self.recompute();
    }

    // ─── Selection and detail ───────────────────────────────────────────

    /// A click on a row: toggles membership while a selection exists,
    /// otherwise opens single-job detail.
    pub fn activate(&mut self, id: &str) -> Activation {
        if !self.repository.contains(id) {
            log::debug!("Ignoring activation of unknown job {}", id);
            return Activation::Ignored;
        }
        let activation = self.selection.activate(id);
        if let Activation::OpenDetail(ref id) = activation {
            self.open_job = Some(id.clone());
        }
        activation
    }

    pub fn close_detail(&mut self) {
        self.open_job = None;
    }

    /// Returns the new membership, or `None` if the id is unknown.
    pub fn toggle_selection(&mut self, id: &str) -> Option<bool> {
        if !self.repository.contains(id) {
            return None;
        }
        let selected = self.selection.toggle(id);
        if selected {
            self.open_job = None;
        }
        Some(selected)
    }

    /// Toggle-all over the currently visible jobs.
    pub fn toggle_select_all(&mut self) {
        self.selection
            .select_all(self.view.iter().map(|job| job.id.as_str()));
        if !self.selection.is_empty() {
            self.open_job = None;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_draft_comment(&mut self, text: &str) {
        self.selection.set_draft_comment(text);
    }

    pub fn set_draft_solution(&mut self, text: &str) {
        self.selection.set_draft_solution(text);
    }

    // ─── Mutations ──────────────────────────────────────────────────────

    fn target(&self) -> MutationTarget {
        let target = MutationTarget::resolve(&self.selection, self.open_job.as_deref());
        if target == MutationTarget::Nothing {
            log::debug!("Mutation ignored: no selection and no open job");
        }
        target
    }

    pub fn mark_checking(&mut self) -> MutationOutcome {
        let target = self.target();
        let outcome = mutation::mark_checking(&mut self.repository, &target, &self.operator);
        self.finish_status_change(&outcome, TriageState::BeingChecked);
        outcome
    }

    pub fn mark_fixed(&mut self) -> MutationOutcome {
        let target = self.target();
        let outcome = mutation::mark_fixed(&mut self.repository, &target, &self.operator);
        self.finish_status_change(&outcome, TriageState::Fixed);
        outcome
    }

    fn finish_status_change(&mut self, outcome: &MutationOutcome, state: TriageState) {
        if !outcome.is_empty() {
            log::info!(
                "{} marked {} job(s) as {}",
                self.operator,
                outcome.affected.len(),
                state
            );
            self.notifier.send(Notification::status_changed(
                &outcome.affected,
                state,
                &self.operator,
            ));
        }
        self.recompute();
    }

    /// Saves a comment on the open job or the selection. Blank text is a no-op.
    pub fn save_comment(&mut self, text: &str) -> MutationOutcome {
        let target = self.target();
        let outcome = mutation::set_comment(&mut self.repository, &target, text);
        self.finish_annotation(&outcome, Annotation::Comment);
        outcome
    }

    /// Saves a solution on the open job or the selection. Blank text is a no-op.
    pub fn save_solution(&mut self, text: &str) -> MutationOutcome {
        let target = self.target();
        let outcome = mutation::set_solution(&mut self.repository, &target, text);
        self.finish_annotation(&outcome, Annotation::Solution);
        outcome
    }

    /// Applies the bulk draft to every selected job, then clears the
    /// selection and the draft. Blank draft fields leave existing values alone.
    pub fn save_bulk_draft(&mut self) -> MutationOutcome {
        if self.selection.is_empty() {
            log::debug!("Bulk save ignored: nothing selected");
            return MutationOutcome::default();
        }

        let target = MutationTarget::resolve(&self.selection, None);
        let draft = self.selection.draft().clone();

        let comments = mutation::set_comment(&mut self.repository, &target, &draft.comment);
        self.finish_annotation(&comments, Annotation::Comment);
        let solutions = mutation::set_solution(&mut self.repository, &target, &draft.solution);
        self.finish_annotation(&solutions, Annotation::Solution);

        self.selection.clear();

        let mut affected = comments.affected;
        for id in solutions.affected {
            if !affected.contains(&id) {
                affected.push(id);
            }
        }
        MutationOutcome { affected }
    }

    fn finish_annotation(&mut self, outcome: &MutationOutcome, annotation: Annotation) {
        if !outcome.is_empty() {
            self.notifier
                .send(Notification::annotation_saved(&outcome.affected, annotation));
        }
        self.recompute();
    }
}
