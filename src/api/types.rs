//! API response type definitions.
//!
//! Posts and media keep every field they do not model (`extra`), so the
//! listing dump written next to the downloads carries everything the API sent.
//! Modeled optional fields are written only when they hold a value; an
//! explicit `null` in the response is dumped as an absent field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error object returned in place of a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// A listing endpoint response: an error object, a bare array, or a
/// `{ list }` envelope. Any other shape fails to parse.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Error { error: ApiErrorBody },
    Items(Vec<T>),
    Envelope { list: Vec<T> },
}

/// Response of the post count query (`counters=1`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountResponse {
    Error { error: ApiErrorBody },
    Counters { counters: PostCounters },
}

/// Counters returned when `counters=1`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCounters {
    pub posts_count: u64,
}

/// Whether a parsed response is the API's error object.
pub trait ErrorObject {
    fn is_error_object(&self) -> bool;
}

impl<T> ErrorObject for Listing<T> {
    fn is_error_object(&self) -> bool {
        matches!(self, Listing::Error { .. })
    }
}

impl ErrorObject for CountResponse {
    fn is_error_object(&self) -> bool {
        matches!(self, CountResponse::Error { .. })
    }
}

/// An active subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub username: String,
}

/// A post from a creator's feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub author: Author,
    #[serde(default)]
    pub media: Vec<ApiMedia>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Post author reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Media entry attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMedia {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    /// Direct URL of the full-size file, when not protected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<MediaFiles>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// File locations of a media entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<FileLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm: Option<DrmFiles>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A plain file location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Protected stream manifests and the cookies that unlock them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrmFiles {
    #[serde(default)]
    pub manifest: DrmManifest,
    #[serde(default)]
    pub signature: DrmSignatures,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrmManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrmSignatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<CloudFrontCookies>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// CloudFront signed-cookie triple.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudFrontCookies {
    #[serde(rename = "CloudFront-Policy")]
    pub policy: String,
    #[serde(
        rename = "CloudFront-Signature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<String>,
    #[serde(
        rename = "CloudFront-Key-Pair-Id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub key_pair_id: Option<String>,
}
