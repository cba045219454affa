//! Configuration validation logic.

use crate::config::loader::{AuthConfig, Config};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_auth(&config.auth)?;
    validate_concurrency("options.page_concurrency", config.options.page_concurrency)?;
    validate_concurrency(
        "options.download_concurrency",
        config.options.download_concurrency,
    )?;

    Ok(())
}

/// Validate that every credential field is filled in.
pub fn validate_auth(auth: &AuthConfig) -> Result<()> {
    let fields = [
        ("auth.identity_id", &auth.identity_id),
        ("auth.user_agent", &auth.user_agent),
        ("auth.session_token", &auth.session_token),
        ("auth.client_token", &auth.client_token),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(Error::MissingConfig(field.to_string()));
        }
    }

    if !auth.identity_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::ConfigValidation {
            field: "auth.identity_id".to_string(),
            message: format!("Expected a numeric account id, got '{}'", auth.identity_id),
        });
    }

    Ok(())
}

fn validate_concurrency(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Must be at least 1".to_string(),
        });
    }
    Ok(())
}
