//! Filter engine: criteria → visible subset.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{Job, TextField};

/// Date restriction applied to a job's reference timestamp.
///
/// "Today only" and an explicit date are one enum so they cannot both be active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "date")]
pub enum DateScope {
    #[default]
    Any,
    Today,
    Day(NaiveDate),
}

/// Case-insensitive substring filters; an empty string is inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextFilters {
    pub name: String,
    pub application: String,
    pub sub_application: String,
    pub folder: String,
}

impl TextFilters {
    pub fn get(&self, field: TextField) -> &str {
        match field {
            TextField::Name => &self.name,
            TextField::Application => &self.application,
            TextField::SubApplication => &self.sub_application,
            TextField::Folder => &self.folder,
        }
    }

    pub fn set(&mut self, field: TextField, value: impl Into<String>) {
        let value = value.into();
        match field {
            TextField::Name => self.name = value,
            TextField::Application => self.application = value,
            TextField::SubApplication => self.sub_application = value,
            TextField::Folder => self.folder = value,
        }
    }
}

/// Operator-chosen predicate parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub text: TextFilters,
    /// Fixed jobs are hidden unless set.
    pub show_fixed: bool,
    pub date: DateScope,
}

impl FilterCriteria {
    pub fn today_only(&self) -> bool {
        self.date == DateScope::Today
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        match self.date {
            DateScope::Day(day) => Some(day),
            _ => None,
        }
    }

    /// Activating "today only" clears any selected date.
    pub fn set_today_only(&mut self, enabled: bool) {
        if enabled {
            self.date = DateScope::Today;
        } else if self.date == DateScope::Today {
            self.date = DateScope::Any;
        }
    }

    /// Selecting a date clears "today only".
    pub fn set_selected_date(&mut self, day: Option<NaiveDate>) {
        match day {
            Some(day) => self.date = DateScope::Day(day),
            None => {
                if matches!(self.date, DateScope::Day(_)) {
                    self.date = DateScope::Any;
                }
            }
        }
    }

    pub fn matches<Tz: TimeZone>(&self, job: &Job, today: NaiveDate, tz: &Tz) -> bool {
        self.matches_text(job) && self.matches_fixed(job) && self.matches_date(job, today, tz)
    }

    fn matches_text(&self, job: &Job) -> bool {
        TextField::ALL.iter().all(|&field| {
            let needle = self.text.get(field).trim();
            if needle.is_empty() {
                return true;
            }
            match field.get(job) {
                Some(value) => value.to_lowercase().contains(&needle.to_lowercase()),
                None => false,
            }
        })
    }

    fn matches_fixed(&self, job: &Job) -> bool {
        self.show_fixed || !job.is_fixed
    }

    fn matches_date<Tz: TimeZone>(&self, job: &Job, today: NaiveDate, tz: &Tz) -> bool {
        let day = match self.date {
            DateScope::Any => return true,
            DateScope::Today => today,
            DateScope::Day(day) => day,
        };

        let Some(reference) = job.reference_time() else {
            return false;
        };

        match day_window(day, tz) {
            Some((start, end)) => reference >= start && reference < end,
            None => false,
        }
    }
}

/// `[start of day, start of next day)` of `day` in `tz`, as UTC instants.
pub fn day_window<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_midnight(day, tz)?;
    let end = local_midnight(day.succ_opt()?, tz)?;
    Some((start, end))
}

fn local_midnight<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    // A DST gap can swallow midnight; the day then starts at the first valid hour.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            let one_am = day.and_hms_opt(1, 0, 0)?;
            tz.from_local_datetime(&one_am).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns the jobs matching `criteria`, in input order.
pub fn filter_jobs<Tz: TimeZone>(
    jobs: &[Job],
    criteria: &FilterCriteria,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<Job> {
    jobs.iter()
        .filter(|job| criteria.matches(job, today, tz))
        .cloned()
        .collect()
}

/// [`filter_jobs`] against the host's local zone and current date.
pub fn filter_jobs_local(jobs: &[Job], criteria: &FilterCriteria) -> Vec<Job> {
    let today = Local::now().date_naive();
    filter_jobs(jobs, criteria, today, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use chrono::FixedOffset;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn job(id: &str) -> Job {
        Job::new(id, JobStatus::Failed)
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_hides_fixed_by_default() {
        let mut fixed = job("2");
        fixed.is_fixed = true;
        let jobs = vec![job("1"), fixed];

        let result = filter_jobs(&jobs, &FilterCriteria::default(), today(), &Utc);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");

        let criteria = FilterCriteria {
            show_fixed: true,
            ..Default::default()
        };
        assert_eq!(filter_jobs(&jobs, &criteria, today(), &Utc).len(), 2);
    }

    #[test]
    fn test_text_filter_is_case_insensitive_and_excludes_missing() {
        let mut a = job("1");
        a.application = Some("Finance-Core".to_string());
        let mut b = job("2");
        b.application = Some("HR".to_string());
        let c = job("3");
        let jobs = vec![a, b, c];

        let mut criteria = FilterCriteria::default();
        criteria.text.set(TextField::Application, "finance");

        let result = filter_jobs(&jobs, &criteria, today(), &Utc);
        assert_eq!(result.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn test_blank_text_filter_is_inactive() {
        let jobs = vec![job("1")];
        let mut criteria = FilterCriteria::default();
        criteria.text.set(TextField::Name, "   ");

        assert_eq!(filter_jobs(&jobs, &criteria, today(), &Utc).len(), 1);
    }

    #[test]
    fn test_today_only_window() {
        let mut yesterday = job("old");
        yesterday.order_date = Some(at("2024-03-14T23:59:59Z"));
        let mut early = job("early");
        early.order_date = Some(at("2024-03-15T00:00:01Z"));
        let mut tomorrow = job("next");
        tomorrow.order_date = Some(at("2024-03-16T00:00:00Z"));
        let undated = job("undated");
        let jobs = vec![yesterday, early, tomorrow, undated];

        let mut criteria = FilterCriteria::default();
        criteria.set_today_only(true);

        let result = filter_jobs(&jobs, &criteria, today(), &Utc);
        assert_eq!(result.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(), vec!["early"]);
    }

    #[test]
    fn test_start_time_used_when_order_date_missing() {
        let mut started = job("1");
        started.start_time = Some(at("2024-03-15T12:00:00Z"));
        let jobs = vec![started];

        let mut criteria = FilterCriteria::default();
        criteria.set_today_only(true);

        assert_eq!(filter_jobs(&jobs, &criteria, today(), &Utc).len(), 1);
    }

    #[test]
    fn test_selected_date_uses_local_day_boundaries() {
        // 2024-03-10 23:30 in UTC-03:00 is 2024-03-11 02:30 UTC.
        let mut late = job("late");
        late.order_date = Some(at("2024-03-11T02:30:00Z"));
        let jobs = vec![late];
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();

        let mut criteria = FilterCriteria::default();
        criteria.set_selected_date(NaiveDate::from_ymd_opt(2024, 3, 10));

        assert_eq!(filter_jobs(&jobs, &criteria, today(), &tz).len(), 1);
        assert_eq!(filter_jobs(&jobs, &criteria, today(), &Utc).len(), 0);
    }

    #[test]
    fn test_today_and_selected_date_are_exclusive() {
        let mut criteria = FilterCriteria::default();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        criteria.set_selected_date(Some(day));
        assert_eq!(criteria.selected_date(), Some(day));

        criteria.set_today_only(true);
        assert!(criteria.today_only());
        assert_eq!(criteria.selected_date(), None);

        criteria.set_selected_date(Some(day));
        assert!(!criteria.today_only());

        criteria.set_today_only(false);
        assert_eq!(criteria.selected_date(), Some(day));

        criteria.set_selected_date(None);
        assert_eq!(criteria.date, DateScope::Any);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut a = job("1");
        a.name = Some("Backup_Weekly".to_string());
        a.order_date = Some(at("2024-03-15T08:00:00Z"));
        let mut b = job("2");
        b.name = Some("ETL_Daily".to_string());
        let jobs = vec![a, b];

        let mut criteria = FilterCriteria::default();
        criteria.text.set(TextField::Name, "_");
        criteria.set_today_only(true);

        let once = filter_jobs(&jobs, &criteria, today(), &Utc);
        let twice = filter_jobs(&once, &criteria, today(), &Utc);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_local_uses_host_clock() {
        let mut current = job("now");
        current.order_date = Some(Utc::now());
        let mut old = job("old");
        old.order_date = Some(at("2001-01-01T12:00:00Z"));
        let jobs = vec![current, old];

        let mut criteria = FilterCriteria::default();
        assert_eq!(filter_jobs_local(&jobs, &criteria).len(), 2);

        criteria.set_today_only(true);
        let result = filter_jobs_local(&jobs, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "now");
    }
}
