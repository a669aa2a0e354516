//! Scheduler module for the log indexer ingest.
//!
//! Repeats a task on a fixed interval, a bounded or unbounded number of
//! times, until exhausted or cancelled.

mod poller;
mod runner;

pub use poller::{FailurePolicy, Iterations, Poller, Repetitions, Runner};
pub use runner::{
    ScheduleCanceller, ScheduleHandle, ScheduleOutcome, ScheduleState, ScheduleSummary,
};
