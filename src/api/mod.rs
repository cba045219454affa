//! Signed API module.
//!
//! This module provides:
//! - HTTP client for the subscription and post endpoints
//! - Request signing from the dynamic rule set
//! - The license exchange endpoint
//! - API response types

pub mod auth;
pub mod client;
pub mod types;

pub use auth::RequestSigner;
pub use client::{OnlyFansApi, PAGE_SIZE};
pub use types::*;
