//! Projection of posts into media descriptors.

use crate::api::types::{ApiMedia, Post};
use crate::media::item::{MediaDescriptor, MediaKind, MediaSource, Protection};

/// Flatten posts into one descriptor per media entry.
///
/// Pure: the result holds exactly one descriptor for every entry of every
/// post's `media` array.
pub fn extract_media(posts: &[Post]) -> Vec<MediaDescriptor> {
    posts
        .iter()
        .flat_map(|post| {
            post.media.iter().map(move |media| MediaDescriptor {
                media_id: media.id,
                post_id: post.id,
                author_id: post.author.id,
                kind: MediaKind::from_api(&media.kind),
                source: resolve_source(media),
            })
        })
        .collect()
}

/// Pick the plain URL when present, otherwise the protected DASH stream.
pub fn resolve_source(media: &ApiMedia) -> Option<MediaSource> {
    let plain = media
        .full
        .as_deref()
        .or_else(|| {
            media
                .files
                .as_ref()
                .and_then(|f| f.full.as_ref())
                .and_then(|f| f.url.as_deref())
        })
        .filter(|url| !url.is_empty());

    if let Some(url) = plain {
        return Some(MediaSource::Plain {
            url: url.to_string(),
        });
    }

    let drm = media.files.as_ref()?.drm.as_ref()?;
    let manifest_url = drm.manifest.dash.clone()?;
    let cookies = drm.signature.dash.as_ref()?;

    Some(MediaSource::Protected(Protection {
        manifest_url,
        policy: cookies.policy.clone(),
        signature: cookies.signature.clone(),
        key_pair_id: cookies.key_pair_id.clone(),
    }))
}
