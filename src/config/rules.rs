//! Dynamic signing rules.
//!
//! The API rotates the constants used to sign requests. They are published as a
//! small JSON document, e.g.:
//!
//! ```json
//! {
//!   "static_param": "RyY8GpixStP90t68HWIJ8Qzo745n0hy0",
//!   "format": "30586:{}:{:x}:67d0e2a7",
//!   "checksum_indexes": [0, 1, 3, 8],
//!   "checksum_constant": 145,
//!   "app_token": "33d57ade8c02dbc5a333db99ff9ae26a"
//! }
//! ```

use std::path::Path;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Immutable rule set used by the request signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRules {
    pub static_param: String,
    pub checksum_indexes: Vec<usize>,
    pub checksum_constant: i64,
    /// Template with `{}` (digest) and `{:x}` (checksum) placeholders.
    pub signature_template: String,
    pub app_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRules {
    static_param: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default, alias = "start")]
    prefix: Option<String>,
    #[serde(default, alias = "end")]
    suffix: Option<String>,
    checksum_indexes: Vec<usize>,
    checksum_constant: i64,
    #[serde(default)]
    app_token: Option<String>,
}

impl TryFrom<RawRules> for DynamicRules {
    type Error = Error;

    fn try_from(raw: RawRules) -> Result<Self> {
        let signature_template = match (raw.format, raw.prefix, raw.suffix) {
            (Some(format), _, _) => format,
            (None, Some(prefix), Some(suffix)) => format!("{}:{{}}:{{:x}}:{}", prefix, suffix),
            _ => {
                return Err(Error::DynamicRules(
                    "rules define neither 'format' nor 'prefix'/'suffix'".into(),
                ))
            }
        };

        if raw.static_param.is_empty() {
            return Err(Error::DynamicRules("'static_param' is empty".into()));
        }

        if !signature_template.contains("{:x}") && !signature_template.contains("{}") {
            return Err(Error::DynamicRules(format!(
                "signature template '{}' has no placeholder",
                signature_template
            )));
        }

        Ok(Self {
            static_param: raw.static_param,
            checksum_indexes: raw.checksum_indexes,
            checksum_constant: raw.checksum_constant,
            signature_template,
            app_token: raw.app_token.filter(|t| !t.is_empty()),
        })
    }
}

impl DynamicRules {
    /// Parse a rules document.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawRules = serde_json::from_str(text)
            .map_err(|e| Error::DynamicRules(format!("invalid rules document: {}", e)))?;
        raw.try_into()
    }

    /// Load rules from a local file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::DynamicRules(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Fetch rules from a remote document.
    pub async fn fetch(client: &Client, url: &str) -> Result<Self> {
        tracing::debug!("Fetching dynamic rules from {}", url);
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::DynamicRules(format!(
                "HTTP {} fetching {}",
                response.status(),
                url
            )));
        }

        let text = response.text().await?;
        Self::from_json(&text)
    }
}
