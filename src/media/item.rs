//! Media descriptor representation.

use std::fmt;

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
}

impl MediaKind {
    /// Map the API `type` string. Anything that is neither a photo nor audio
    /// (videos, gifs, unknown types) is treated as video.
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "photo" => MediaKind::Photo,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }

    /// File extension used for the downloaded file.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Access to a protected stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protection {
    /// DASH manifest URL.
    pub manifest_url: String,
    /// CloudFront policy token authorizing manifest access.
    pub policy: String,
    pub signature: Option<String>,
    pub key_pair_id: Option<String>,
}

impl Protection {
    /// Cookie header value unlocking the manifest and its segments.
    pub fn cookie_header(&self) -> String {
        let mut cookie = format!("CloudFront-Policy={};", self.policy);
        if let Some(signature) = &self.signature {
            cookie.push_str(&format!(" CloudFront-Signature={};", signature));
        }
        if let Some(key_pair_id) = &self.key_pair_id {
            cookie.push_str(&format!(" CloudFront-Key-Pair-Id={};", key_pair_id));
        }
        cookie
    }
}

/// Where the bytes of a media item come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Directly fetchable file.
    Plain { url: String },
    /// Widevine-protected DASH stream.
    Protected(Protection),
}

/// A downloadable media item, tagged with its owning post and author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub media_id: u64,
    pub post_id: u64,
    pub author_id: u64,
    pub kind: MediaKind,
    /// `None` when the account cannot view the media.
    pub source: Option<MediaSource>,
}

impl MediaDescriptor {
    /// Extension of the final file. Decrypted streams are always remuxed to mp4.
    pub fn extension(&self) -> &'static str {
        match self.source {
            Some(MediaSource::Protected(_)) => "mp4",
            _ => self.kind.extension(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self.source, Some(MediaSource::Protected(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(MediaKind::from_api("photo"), MediaKind::Photo);
        assert_eq!(MediaKind::from_api("audio"), MediaKind::Audio);
        assert_eq!(MediaKind::from_api("video"), MediaKind::Video);
        assert_eq!(MediaKind::from_api("gif"), MediaKind::Video);

        assert_eq!(MediaKind::Photo.extension(), "jpg");
        assert_eq!(MediaKind::Audio.extension(), "mp3");
        assert_eq!(MediaKind::Video.extension(), "mp4");
    }

    #[test]
    fn test_protected_always_mp4() {
        let item = MediaDescriptor {
            media_id: 1,
            post_id: 2,
            author_id: 3,
            kind: MediaKind::Audio,
            source: Some(MediaSource::Protected(Protection {
                manifest_url: "https://cdn/m.mpd".into(),
                policy: "p".into(),
                signature: None,
                key_pair_id: None,
            })),
        };
        assert_eq!(item.extension(), "mp4");
        assert!(item.is_protected());
    }

    #[test]
    fn test_cookie_header() {
        let mut protection = Protection {
            manifest_url: "https://cdn/m.mpd".into(),
            policy: "pol".into(),
            signature: None,
            key_pair_id: None,
        };
        assert_eq!(protection.cookie_header(), "CloudFront-Policy=pol;");

        protection.signature = Some("sig".into());
        protection.key_pair_id = Some("kp".into());
        assert_eq!(
            protection.cookie_header(),
            "CloudFront-Policy=pol; CloudFront-Signature=sig; CloudFront-Key-Pair-Id=kp;"
        );
    }
}
