//! Grouping and counts over a projected job list.

use serde::Serialize;

use crate::job::{Job, JobStatus, TextField, TriageState};

/// Jobs sharing one value of the grouping field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobGroup {
    /// `None` collects jobs without a value for the field.
    pub key: Option<String>,
    pub jobs: Vec<Job>,
}

/// Groups `jobs` by `field`. Groups appear in order of first occurrence and
/// keep the input order inside.
pub fn group_jobs(jobs: &[Job], field: TextField) -> Vec<JobGroup> {
    let mut groups: Vec<JobGroup> = Vec::new();

    for job in jobs {
        let key = field.get(job).map(str::to_string);
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.jobs.push(job.clone()),
            None => groups.push(JobGroup {
                key,
                jobs: vec![job.clone()],
            }),
        }
    }

    groups
}

/// Counts by lifecycle status and by triage state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub waiting: usize,
    /// Failed jobs nobody has picked up yet.
    pub open: usize,
    pub being_checked: usize,
    pub fixed: usize,
}

impl JobStats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut stats = JobStats {
            total: jobs.len(),
            ..Default::default()
        };

        for job in jobs {
            match job.status {
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Waiting => stats.waiting += 1,
            }
            match job.triage_state() {
                TriageState::Failed => stats.open += 1,
                TriageState::BeingChecked => stats.being_checked += 1,
                TriageState::Fixed => stats.fixed += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_app(id: &str, app: Option<&str>) -> Job {
        let mut job = Job::new(id, JobStatus::Failed);
        job.application = app.map(str::to_string);
        job
    }

    #[test]
    fn test_group_preserves_first_appearance_order() {
        let jobs = vec![
            in_app("1", Some("Finance")),
            in_app("2", None),
            in_app("3", Some("HR")),
            in_app("4", Some("Finance")),
        ];

        let groups = group_jobs(&jobs, TextField::Application);

        let keys: Vec<Option<&str>> = groups.iter().map(|g| g.key.as_deref()).collect();
        assert_eq!(keys, vec![Some("Finance"), None, Some("HR")]);
        let finance: Vec<&str> = groups[0].jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(finance, vec!["1", "4"]);
    }

    #[test]
    fn test_stats_counts() {
        let mut checking = Job::new("1", JobStatus::Failed);
        checking.is_being_checked = true;
        let mut fixed = Job::new("2", JobStatus::Failed);
        fixed.is_fixed = true;
        let jobs = vec![
            checking,
            fixed,
            Job::new("3", JobStatus::Failed),
            Job::new("4", JobStatus::Running),
        ];

        let stats = JobStats::from_jobs(&jobs);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.running, 1);
        assert_eq!(stats.being_checked, 1);
        assert_eq!(stats.fixed, 1);
        assert_eq!(stats.open, 2);
    }
}
