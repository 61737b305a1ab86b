//! In-memory triage board: repository, derived view and operator actions.

pub mod filter;
pub mod mutation;
pub mod projection;
pub mod repository;
pub mod selection;
pub mod sort;
pub mod state;
pub mod summary;

pub use filter::{filter_jobs, filter_jobs_local, DateScope, FilterCriteria, TextFilters};
pub use mutation::{MutationOutcome, MutationTarget};
pub use projection::project;
pub use repository::{JobRepository, MergeOutcome, SnapshotPolicy};
pub use selection::{Activation, BulkDraft, SelectionTracker};
pub use sort::{sort_jobs, SortDirection, SortField, SortSpec};
pub use state::{DashboardState, PollTicket, SnapshotReport};
pub use summary::{group_jobs, JobGroup, JobStats};
