//! Authoritative in-memory set of known jobs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::job::Job;

/// How a snapshot treats operator-owned fields of jobs it replaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotPolicy {
    /// The incoming snapshot is taken as-is.
    #[default]
    Overwrite,
    /// Triage fields carry over from the previous record with the same id
    /// when the incoming record has none of its own.
    PreserveTriage,
}

/// Result of [`JobRepository::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
}

/// Ordered job set with an id index.
#[derive(Debug, Default, Clone)]
pub struct JobRepository {
    jobs: Vec<Job>,
    index: HashMap<String, usize>,
    policy: SnapshotPolicy,
}

impl JobRepository {
    pub fn new(policy: SnapshotPolicy) -> Self {
        Self {
            jobs: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    /// Overwrites the known set with a new snapshot.
    ///
    /// A duplicated id inside the snapshot keeps its first position and the
    /// last record's contents.
    pub fn replace(&mut self, snapshot: Vec<Job>) {
        let mut jobs: Vec<Job> = Vec::with_capacity(snapshot.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(snapshot.len());

        for mut job in snapshot {
            if self.policy == SnapshotPolicy::PreserveTriage && !job.has_triage() {
                if let Some(previous) = self.get(&job.id) {
                    job.inherit_triage(previous);
                }
            }

            match index.get(&job.id) {
                Some(&pos) => {
                    log::debug!("Snapshot contains duplicate job id {}, keeping last", job.id);
                    jobs[pos] = job;
                }
                None => {
                    index.insert(job.id.clone(), jobs.len());
                    jobs.push(job);
                }
            }
        }

        self.jobs = jobs;
        self.index = index;
    }

    /// Appends a job if its id is new, otherwise replaces the stored record in place.
    pub fn merge(&mut self, mut job: Job) -> MergeOutcome {
        match self.index.get(&job.id) {
            Some(&pos) => {
                if self.policy == SnapshotPolicy::PreserveTriage && !job.has_triage() {
                    job.inherit_triage(&self.jobs[pos]);
                }
                self.jobs[pos] = job;
                MergeOutcome::Replaced
            }
            None => {
                self.index.insert(job.id.clone(), self.jobs.len());
                self.jobs.push(job);
                MergeOutcome::Inserted
            }
        }
    }

    pub fn all(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.index.get(id).map(|&pos| &self.jobs[pos])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Job> {
        match self.index.get(id) {
            Some(&pos) => self.jobs.get_mut(pos),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|job| job.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
