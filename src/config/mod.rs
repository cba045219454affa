//! Configuration module for the of-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files (or writing a template)
//! - Loading the dynamic signing rules
//! - Configuration validation

pub mod loader;
pub mod rules;
pub mod validation;

pub use loader::{AuthConfig, Config, ConfigState, DrmConfig, OptionsConfig, DEFAULT_API_BASE};
pub use rules::DynamicRules;
pub use validation::{validate_auth, validate_config};
