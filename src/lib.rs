//! of-downloader - downloads every media item of the account's active
//! subscriptions.
//!
//! # Features
//!
//! - Signed API requests from a dynamic rule set
//! - Count-driven, concurrent post pagination
//! - Bounded-concurrency, resumable media downloads with completion markers
//! - Widevine-protected video: PSSH extraction, license exchange and ffmpeg decryption
//! - Raw listing dump per subscription
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use of_downloader::{Config, DynamicRules, OnlyFansApi, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let rules = DynamicRules::load(&config.options.dynamic_rules)?;
//!     let api = OnlyFansApi::new(
//!         &config.options.api_base,
//!         RequestSigner::new(config.auth.clone(), rules),
//!     )?;
//!
//!     for subscription in api.list_active_subscriptions().await? {
//!         println!("{}", subscription.username);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod drm;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use api::{OnlyFansApi, RequestSigner};
pub use config::{Config, DynamicRules};
pub use download::{Downloader, GlobalState, RunReport};
pub use error::{Error, Result};
pub use media::{MediaDescriptor, MediaKind};
