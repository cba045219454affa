//! Filesystem module.
//!
//! Provides:
//! - The download folder layout
//! - Completion markers and listing dumps

pub mod paths;

pub use paths::DownloadLayout;
