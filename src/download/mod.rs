//! Download module for content acquisition.
//!
//! This module provides:
//! - Post aggregation (count then paginated fan-out)
//! - Per-item acquisition (plain streams and protected media)
//! - The bounded-concurrency scheduler
//! - Run reports and statistics
//! - Whole-run orchestration over subscriptions

pub mod acquire;
pub mod pipeline;
pub mod posts;
pub mod scheduler;
pub mod state;

pub use acquire::{Acquire, AcquireOutcome, MediaAcquirer};
pub use pipeline::Downloader;
pub use posts::{all_posts, page_offsets};
pub use scheduler::DownloadScheduler;
pub use state::{GlobalState, ItemFailure, RunReport, SubscriptionState};
