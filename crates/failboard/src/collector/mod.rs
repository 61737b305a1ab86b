//! Job collector: the external REST source of failed-job snapshots.

pub mod client;
pub mod error;

pub use client::{ClientOptions, CollectorClient, JobSource, RetryPolicy};
pub use error::PollError;
