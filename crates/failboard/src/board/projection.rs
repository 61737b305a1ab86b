//! View projection: filter, then sort.

use chrono::{NaiveDate, TimeZone};

use crate::board::filter::{filter_jobs, FilterCriteria};
use crate::board::sort::{sort_jobs, SortSpec};
use crate::job::Job;

/// The list presented to the operator. Always recomputed in full.
pub fn project<Tz: TimeZone>(
    jobs: &[Job],
    criteria: &FilterCriteria,
    sort: &SortSpec,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<Job> {
    let filtered = filter_jobs(jobs, criteria, today, tz);
    sort_jobs(&filtered, sort)
}
