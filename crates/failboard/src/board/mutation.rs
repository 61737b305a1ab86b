//! Mutation engine: triage transitions and annotation edits.
//!
//! Every operation targets either the whole selection or the single open job,
//! with the selection taking precedence. Ids no longer in the repository are
//! skipped silently.

use crate::board::repository::JobRepository;
use crate::board::selection::SelectionTracker;
use crate::job::Job;

/// Jobs a mutation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationTarget {
    Selection(Vec<String>),
    Single(String),
    /// Neither a selection nor an open job; mutations are no-ops.
    Nothing,
}

impl MutationTarget {
    pub fn resolve(selection: &SelectionTracker, open_job: Option<&str>) -> Self {
        if !selection.is_empty() {
            MutationTarget::Selection(selection.ids().map(str::to_string).collect())
        } else if let Some(id) = open_job {
            MutationTarget::Single(id.to_string())
        } else {
            MutationTarget::Nothing
        }
    }

    pub fn ids(&self) -> &[String] {
        match self {
            MutationTarget::Selection(ids) => ids,
            MutationTarget::Single(id) => std::slice::from_ref(id),
            MutationTarget::Nothing => &[],
        }
    }
}

/// Ids a mutation actually touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub affected: Vec<String>,
}

impl MutationOutcome {
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }
}

fn apply<F>(repository: &mut JobRepository, target: &MutationTarget, mut f: F) -> MutationOutcome
where
    F: FnMut(&mut Job),
{
    let mut affected = Vec::new();
    for id in target.ids() {
        match repository.get_mut(id) {
            Some(job) => {
                f(job);
                affected.push(id.clone());
            }
            None => log::debug!("Skipping mutation for unknown job {}", id),
        }
    }
    MutationOutcome { affected }
}

/// Marks targets as being checked by `operator`.
///
/// A fixed job is reopened: `is_fixed` is cleared so the flags stay mutually
/// exclusive, while `fixed_by` is kept as history.
pub fn mark_checking(
    repository: &mut JobRepository,
    target: &MutationTarget,
    operator: &str,
) -> MutationOutcome {
    apply(repository, target, |job| {
        if !job.is_being_checked {
            job.is_being_checked = true;
            job.checked_by = Some(operator.to_string());
        }
        job.is_fixed = false;
    })
}

/// Marks targets as fixed by `operator`. `checked_by` is kept.
pub fn mark_fixed(
    repository: &mut JobRepository,
    target: &MutationTarget,
    operator: &str,
) -> MutationOutcome {
    apply(repository, target, |job| {
        if !job.is_fixed {
            job.is_fixed = true;
            job.fixed_by = Some(operator.to_string());
        }
        job.is_being_checked = false;
    })
}

/// Overwrites the comment when `text` is non-blank; otherwise nothing changes.
pub fn set_comment(
    repository: &mut JobRepository,
    target: &MutationTarget,
    text: &str,
) -> MutationOutcome {
    if text.trim().is_empty() {
        return MutationOutcome::default();
    }
    apply(repository, target, |job| job.comment = Some(text.to_string()))
}

/// Overwrites the solution when `text` is non-blank; otherwise nothing changes.
pub fn set_solution(
    repository: &mut JobRepository,
    target: &MutationTarget,
    text: &str,
) -> MutationOutcome {
    if text.trim().is_empty() {
        return MutationOutcome::default();
    }
    apply(repository, target, |job| job.solution = Some(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;

    fn repo_with(ids: &[&str]) -> JobRepository {
        let mut repo = JobRepository::default();
        repo.replace(ids.iter().map(|id| Job::new(*id, JobStatus::Failed)).collect());
        repo
    }

    fn selection(ids: &[&str]) -> MutationTarget {
        MutationTarget::Selection(ids.iter().map(|id| id.to_string()).collect())
    }

    #[test]
    fn test_resolve_prefers_selection() {
        let mut tracker = SelectionTracker::new();
        assert_eq!(MutationTarget::resolve(&tracker, None), MutationTarget::Nothing);
        assert_eq!(
            MutationTarget::resolve(&tracker, Some("5")),
            MutationTarget::Single("5".to_string())
        );

        tracker.toggle("1");
        assert_eq!(MutationTarget::resolve(&tracker, Some("5")), selection(&["1"]));
    }

    #[test]
    fn test_bulk_mark_fixed_leaves_others_untouched() {
        let mut repo = repo_with(&["1", "2", "3"]);
        repo.get_mut("1").unwrap().is_being_checked = true;

        let outcome = mark_fixed(&mut repo, &selection(&["1", "3"]), "operator");
        assert_eq!(outcome.affected, vec!["1", "3"]);

        for id in ["1", "3"] {
            let job = repo.get(id).unwrap();
            assert!(job.is_fixed);
            assert!(!job.is_being_checked);
            assert_eq!(job.fixed_by.as_deref(), Some("operator"));
        }
        assert_eq!(repo.get("2").unwrap(), &Job::new("2", JobStatus::Failed));
    }

    #[test]
    fn test_mark_fixed_keeps_checked_by() {
        let mut repo = repo_with(&["1"]);
        let target = MutationTarget::Single("1".to_string());

        mark_checking(&mut repo, &target, "ana");
        mark_fixed(&mut repo, &target, "bruno");

        let job = repo.get("1").unwrap();
        assert_eq!(job.checked_by.as_deref(), Some("ana"));
        assert_eq!(job.fixed_by.as_deref(), Some("bruno"));
    }

    #[test]
    fn test_mark_checking_reopens_fixed_job() {
        let mut repo = repo_with(&["1"]);
        let target = MutationTarget::Single("1".to_string());

        mark_fixed(&mut repo, &target, "ana");
        mark_checking(&mut repo, &target, "bruno");

        let job = repo.get("1").unwrap();
        assert!(job.is_being_checked);
        assert!(!job.is_fixed);
        assert_eq!(job.checked_by.as_deref(), Some("bruno"));
        assert_eq!(job.fixed_by.as_deref(), Some("ana"));
    }

    #[test]
    fn test_checked_by_stamped_only_on_transition() {
        let mut repo = repo_with(&["1"]);
        let target = MutationTarget::Single("1".to_string());

        mark_checking(&mut repo, &target, "ana");
        mark_checking(&mut repo, &target, "bruno");

        assert_eq!(repo.get("1").unwrap().checked_by.as_deref(), Some("ana"));
    }

    #[test]
    fn test_empty_comment_does_not_erase() {
        let mut repo = repo_with(&["1"]);
        let target = MutationTarget::Single("1".to_string());

        set_comment(&mut repo, &target, "x");
        let outcome = set_comment(&mut repo, &target, "");

        assert!(outcome.is_empty());
        assert_eq!(repo.get("1").unwrap().comment.as_deref(), Some("x"));
    }

    #[test]
    fn test_set_solution_for_selection() {
        let mut repo = repo_with(&["1", "2"]);

        let outcome = set_solution(&mut repo, &selection(&["1", "2"]), "restart agent");

        assert_eq!(outcome.affected.len(), 2);
        assert_eq!(repo.get("2").unwrap().solution.as_deref(), Some("restart agent"));
    }

    #[test]
    fn test_no_target_is_noop() {
        let mut repo = repo_with(&["1"]);
        let outcome = mark_fixed(&mut repo, &MutationTarget::Nothing, "ana");
        assert!(outcome.is_empty());
        assert!(!repo.get("1").unwrap().is_fixed);
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let mut repo = repo_with(&["1"]);
        let outcome = mark_checking(&mut repo, &selection(&["1", "gone"]), "ana");
        assert_eq!(outcome.affected, vec!["1"]);
    }
}
