//! Authentication and request signing utilities.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use sha1::{Digest, Sha1};

use crate::config::{AuthConfig, DynamicRules};
use crate::error::{Error, Result};

/// Computes the signed header set for authenticated API calls.
///
/// Both inputs are immutable after construction; the signer is cheap to clone
/// and shared by every component that talks to the API.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Arc<AuthConfig>,
    rules: Arc<DynamicRules>,
}

impl RequestSigner {
    pub fn new(credentials: AuthConfig, rules: DynamicRules) -> Self {
        Self {
            credentials: Arc::new(credentials),
            rules: Arc::new(rules),
        }
    }

    pub fn credentials(&self) -> &AuthConfig {
        &self.credentials
    }

    /// Compute the `sign` header value for a path at a given unix time.
    ///
    /// `path` is the full API path including the `/api2/v2` prefix and query.
    pub fn signature(&self, path: &str, timestamp: i64) -> Result<String> {
        let timestamp = timestamp.to_string();
        let parts: [&str; 4] = [
            &self.rules.static_param,
            &timestamp,
            path,
            &self.credentials.identity_id,
        ];
        let message = parts.join("\n");

        let digest = hex::encode(Sha1::digest(message.as_bytes()));
        let checksum = checksum(digest.as_bytes(), &self.rules)?;

        let checksum_hex = if checksum < 0 {
            format!("-{:x}", checksum.unsigned_abs())
        } else {
            format!("{:x}", checksum)
        };

        Ok(self
            .rules
            .signature_template
            .replace("{:x}", &checksum_hex)
            .replace("{}", &digest))
    }

    /// Build the complete signed header set for a request.
    pub fn headers(&self, path: &str, timestamp: i64) -> Result<HeaderMap> {
        let creds = &self.credentials;
        let mut headers = HeaderMap::new();

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate"),
        );
        headers.insert(header::USER_AGENT, header_value("user_agent", &creds.user_agent)?);
        headers.insert(
            HeaderName::from_static("x-bc"),
            header_value("client_token", &creds.client_token)?,
        );
        headers.insert(
            HeaderName::from_static("user-id"),
            header_value("identity_id", &creds.identity_id)?,
        );
        headers.insert(
            header::COOKIE,
            header_value(
                "session_token",
                &format!("auth_id={}; sess={}", creds.identity_id, creds.session_token),
            )?,
        );
        headers.insert(
            HeaderName::from_static("sign"),
            header_value("sign", &self.signature(path, timestamp)?)?,
        );
        headers.insert(
            HeaderName::from_static("time"),
            HeaderValue::from(timestamp),
        );

        if let Some(app_token) = &self.rules.app_token {
            headers.insert(
                HeaderName::from_static("app-token"),
                header_value("app_token", app_token)?,
            );
        }

        Ok(headers)
    }

    /// Build signed headers using the current time.
    pub fn headers_now(&self, path: &str) -> Result<HeaderMap> {
        self.headers(path, unix_time())
    }
}

/// Sum the digest characters at the configured positions plus the constant.
fn checksum(digest_hex: &[u8], rules: &DynamicRules) -> Result<i64> {
    let mut sum = rules.checksum_constant;
    for &index in &rules.checksum_indexes {
        let byte = digest_hex.get(index).ok_or_else(|| {
            Error::DynamicRules(format!(
                "checksum index {} outside digest of {} characters",
                index,
                digest_hex.len()
            ))
        })?;
        sum += i64::from(*byte);
    }
    Ok(sum)
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::ConfigValidation {
        field: field.to_string(),
        message: "contains characters not allowed in an HTTP header".to_string(),
    })
}

/// Current unix time in whole seconds.
pub fn unix_time() -> i64 {
    chrono::Utc::now().timestamp()
}
