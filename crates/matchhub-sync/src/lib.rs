//! # matchhub-sync
//!
//! Batch synchronization engine for MatchHub:
//!
//! - The [`SyncJob`] contract every batch workload implements
//! - [`JobRunner`] — drives a job through fixed-size batches with
//!   inter-batch pacing and cooperative cancellation
//! - Concrete jobs: processed-match metadata backfill and
//!   unprocessed-match hydration

pub mod job;
pub mod jobs;
pub mod runner;

pub use job::{JobResult, JobStatus, SyncJob};
pub use runner::JobRunner;
