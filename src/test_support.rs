//! Shared fixtures for unit tests.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::api::{OnlyFansApi, RequestSigner};
use crate::config::{AuthConfig, DynamicRules};
use crate::drm::pssh::tests::build_pssh;
use crate::drm::pssh::WIDEVINE_SYSTEM_ID;
use crate::drm::session::tests::answer_challenge;
use crate::drm::{ContentKey, WidevineDevice};
use crate::media::{MediaDescriptor, MediaKind, MediaSource, Protection};

pub(crate) const MEDIA_BYTES: &[u8] = b"\xff\xd8\xff\xe0 jpeg bytes";

pub(crate) fn test_signer() -> RequestSigner {
    let credentials = AuthConfig {
        identity_id: "123456".into(),
        user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
        session_token: "sess".into(),
        client_token: "xbc".into(),
    };
    let rules = DynamicRules {
        static_param: "static".into(),
        checksum_indexes: vec![0, 1, 2],
        checksum_constant: 7,
        signature_template: "1:{}:{:x}:2".into(),
        app_token: None,
    };
    RequestSigner::new(credentials, rules)
}

pub(crate) fn test_api(server: &MockServer) -> OnlyFansApi {
    OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap()
}

/// Id of the `index`-th post of a user.
pub(crate) fn post_id(user_id: u64, index: u64) -> u64 {
    user_id * 1_000_000 + index
}

/// A post with `media_count` plain photos served by `server`.
pub(crate) fn post_json(server_uri: &str, user_id: u64, id: u64, media_count: u64) -> Value {
    let media: Vec<Value> = (0..media_count)
        .map(|j| {
            let media_id = id * 10 + j;
            json!({
                "id": media_id,
                "type": "photo",
                "canView": true,
                "full": format!("{}/media/{}.jpg", server_uri, media_id),
            })
        })
        .collect();

    json!({
        "id": id,
        "author": {"id": user_id},
        "text": format!("post {}", id),
        "media": media,
    })
}

/// Mount the count query and one page mock per offset for a user with
/// `total` posts.
pub(crate) async fn mount_posts(server: &MockServer, user_id: u64, total: u64, media_per_post: u64) {
    let posts_path = format!("/api2/v2/users/{}/posts", user_id);

    Mock::given(method("GET"))
        .and(path(posts_path.as_str()))
        .and(query_param("counters", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [],
            "hasMore": total > 0,
            "counters": {"postsCount": total},
        })))
        .mount(server)
        .await;

    let mut offset = 0;
    while offset < total {
        let page: Vec<Value> = (offset..total.min(offset + 50))
            .map(|i| post_json(&server.uri(), user_id, post_id(user_id, i), media_per_post))
            .collect();

        Mock::given(method("GET"))
            .and(path(posts_path.as_str()))
            .and(query_param("counters", "0"))
            .and(query_param("offset", offset.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(page)))
            .mount(server)
            .await;

        offset += 50;
    }
}

/// Serve [`MEDIA_BYTES`] for every `/media/*.jpg`.
pub(crate) async fn mount_media(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/media/\d+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(MEDIA_BYTES))
        .mount(server)
        .await;
}

/// Number of received requests whose path starts with `prefix` and whose
/// query contains `query` (empty matches any).
pub(crate) async fn count_requests(server: &MockServer, prefix: &str, query: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .filter(|r| r.url.query().unwrap_or("").contains(query))
        .count()
}

/// License server that answers every challenge with one content key.
pub(crate) struct LicenseServer {
    pub(crate) device: Arc<WidevineDevice>,
}

impl Respond for LicenseServer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let key = ContentKey {
            key_id: vec![1u8; 16],
            key: vec![2u8; 16],
        };
        ResponseTemplate::new(200).set_body_bytes(answer_challenge(
            &self.device,
            &request.body,
            &[key],
        ))
    }
}

/// A DASH manifest carrying one `<cenc:pssh>` element.
pub(crate) fn mpd(pssh: &[u8]) -> String {
    format!(
        "<MPD><ContentProtection><cenc:pssh>{}</cenc:pssh></ContentProtection></MPD>",
        STANDARD.encode(pssh)
    )
}

/// Serve a Widevine-protected manifest at `/dash/manifest.mpd`.
pub(crate) async fn mount_manifest(server: &MockServer) {
    let pssh = build_pssh(0, WIDEVINE_SYSTEM_ID, &[], b"init");
    Mock::given(method("GET"))
        .and(path("/dash/manifest.mpd"))
        .respond_with(ResponseTemplate::new(200).set_body_string(mpd(&pssh)))
        .mount(server)
        .await;
}

/// Signed CloudFront access to the manifest at `/dash/manifest.mpd`.
pub(crate) fn protection(server: &MockServer) -> Protection {
    Protection {
        manifest_url: format!("{}/dash/manifest.mpd", server.uri()),
        policy: "pol".into(),
        signature: Some("sig".into()),
        key_pair_id: Some("kp".into()),
    }
}

pub(crate) fn protected_video(
    server: &MockServer,
    media_id: u64,
    post_id: u64,
    author_id: u64,
) -> MediaDescriptor {
    MediaDescriptor {
        media_id,
        post_id,
        author_id,
        kind: MediaKind::Video,
        source: Some(MediaSource::Protected(protection(server))),
    }
}

/// A plain photo served by [`mount_media`].
pub(crate) fn plain_photo(server: &MockServer, media_id: u64, author_id: u64) -> MediaDescriptor {
    MediaDescriptor {
        media_id,
        post_id: media_id,
        author_id,
        kind: MediaKind::Photo,
        source: Some(MediaSource::Plain {
            url: format!("{}/media/{}.jpg", server.uri(), media_id),
        }),
    }
}
