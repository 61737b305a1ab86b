//! Shared test utilities for failboard integration tests.
//!
//! This module provides:
//! - Builders for jobs and dashboard states
//! - A canned HTTP server standing in for the job collector

pub mod builders;
pub mod collector;

pub use builders::*;
pub use collector::CannedCollector;
