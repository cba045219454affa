//! Signed API HTTP client.

use reqwest::{header, Client, Response};
use url::form_urlencoded;

use crate::api::auth::RequestSigner;
use crate::api::types::*;
use crate::error::{Error, Result};

/// Page size used for every listing request.
pub const PAGE_SIZE: u64 = 50;

/// API client: every call except [`OnlyFansApi::download`] carries signed headers.
#[derive(Debug, Clone)]
pub struct OnlyFansApi {
    client: Client,
    base: String,
    base_path: String,
    signer: RequestSigner,
}

impl OnlyFansApi {
    /// Create a new API client rooted at `api_base` (e.g. `https://onlyfans.com/api2/v2`).
    pub fn new(api_base: &str, signer: RequestSigner) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&signer.credentials().user_agent)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        let parsed = url::Url::parse(api_base)?;
        let base_path = parsed.path().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base: api_base.trim_end_matches('/').to_string(),
            base_path,
            signer,
        })
    }

    /// Underlying HTTP client (shared connection pool).
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Make a signed GET request for an API-relative link such as `/users/1/posts?limit=1`.
    async fn get(&self, link: &str) -> Result<Response> {
        let url = format!("{}{}", self.base, link);
        let headers = self.signer.headers_now(&self.sign_path(link))?;

        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).headers(headers).send().await?;
        tracing::debug!("Response status: {}", response.status());

        Ok(response)
    }

    /// Make a signed POST request with an opaque binary body.
    async fn post_bytes(&self, link: &str, body: Vec<u8>) -> Result<Response> {
        let url = format!("{}{}", self.base, link);
        let headers = self.signer.headers_now(&self.sign_path(link))?;

        tracing::debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await?;
        tracing::debug!("Response status: {}", response.status());

        Ok(response)
    }

    /// Path the signature is computed over: API prefix, link and query.
    fn sign_path(&self, link: &str) -> String {
        format!("{}{}", self.base_path, link)
    }

    /// Parse a JSON response. Error objects are returned as such regardless of
    /// status; any shape the target type does not accept is an `Api` error.
    async fn read_body<R>(&self, response: Response, what: &str) -> Result<R>
    where
        R: serde::de::DeserializeOwned + ErrorObject,
    {
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("{} response: {} bytes", what, text.len());

        let body: R = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} (HTTP {}) - Response: {}",
                what,
                e,
                status,
                text.chars().take(500).collect::<String>()
            ))
        })?;

        if !status.is_success() && !body.is_error_object() {
            return Err(Error::Api(format!("{} returned HTTP {}", what, status)));
        }

        Ok(body)
    }

    /// List the account's active subscriptions.
    pub async fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        let link = format!(
            "/subscriptions/subscribes?{}",
            encode_query(&[
                ("limit", PAGE_SIZE.to_string().as_str()),
                ("order", "publish_date_asc"),
                ("type", "active"),
            ])
        );

        let response = self.get(&link).await?;
        match self.read_body(response, "subscriptions").await? {
            Listing::Items(subs) => Ok(subs),
            Listing::Envelope { list } => Ok(list),
            Listing::Error { error } => Err(Error::Authentication(error.message)),
        }
    }

    /// Fetch the total number of posts of a user.
    pub async fn count_posts(&self, user_id: u64) -> Result<u64> {
        let link = format!(
            "/users/{}/posts?{}",
            user_id,
            encode_query(&[
                ("limit", "1"),
                ("order", "publish_date_desc"),
                ("format", "infinite"),
                ("counters", "1"),
            ])
        );

        let response = self.get(&link).await?;
        match self.read_body(response, "post counters").await? {
            CountResponse::Counters { counters } => Ok(counters.posts_count),
            CountResponse::Error { error } => Err(Error::Api(format!(
                "Counting posts of user {} failed: {}",
                user_id, error.message
            ))),
        }
    }

    /// Fetch one page of posts starting at `offset`.
    pub async fn fetch_posts_page(&self, user_id: u64, offset: u64) -> Result<Vec<Post>> {
        let link = format!(
            "/users/{}/posts?{}",
            user_id,
            encode_query(&[
                ("limit", PAGE_SIZE.to_string().as_str()),
                ("offset", offset.to_string().as_str()),
                ("order", "publish_date_desc"),
                ("skip_users", "all"),
                ("counters", "0"),
            ])
        );

        let response = self.get(&link).await?;
        match self.read_body(response, "posts").await? {
            Listing::Items(posts) => Ok(posts),
            Listing::Envelope { list } => Ok(list),
            Listing::Error { error } => Err(Error::Api(format!(
                "Fetching posts of user {} at offset {} failed: {}",
                user_id, offset, error.message
            ))),
        }
    }

    /// Exchange a Widevine license challenge for a license.
    ///
    /// Every refusal, 401 and 403 included, is a `License` error for this media only.
    pub async fn request_license(
        &self,
        media_id: u64,
        post_id: u64,
        challenge: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let link = format!(
            "/users/media/{}/drm/post/{}?type=widevine",
            media_id, post_id
        );

        let response = self.post_bytes(&link, challenge).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::License(format!(
                "license endpoint returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Unsigned GET for media and manifests, optionally with a Cookie header.
    pub async fn download(&self, url: &str, cookie: Option<&str>) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}

/// Encode query parameters in the order given.
fn encode_query(params: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_signer;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sign_path_includes_prefix_and_query() {
        let api = OnlyFansApi::new("https://onlyfans.com/api2/v2/", test_signer()).unwrap();
        assert_eq!(
            api.sign_path("/users/1/posts?limit=1"),
            "/api2/v2/users/1/posts?limit=1"
        );
    }

    #[test]
    fn test_encode_query_preserves_order() {
        assert_eq!(
            encode_query(&[("limit", "50"), ("order", "publish_date_asc"), ("type", "active")]),
            "limit=50&order=publish_date_asc&type=active"
        );
    }

    #[tokio::test]
    async fn test_list_subscriptions_signed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/v2/subscriptions/subscribes"))
            .and(query_param("limit", "50"))
            .and(query_param("order", "publish_date_asc"))
            .and(query_param("type", "active"))
            .and(header_exists("sign"))
            .and(header_exists("time"))
            .and(header_exists("x-bc"))
            .and(header_exists("user-id"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":1,"username":"alice"},{"id":2,"username":"bob"}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        let subs = api.list_active_subscriptions().await.unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].username, "bob");
    }

    #[tokio::test]
    async fn test_list_subscriptions_error_object_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/v2/subscriptions/subscribes"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"error":{"code":401,"message":"Please refresh the page"}}"#,
            ))
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        match api.list_active_subscriptions().await {
            Err(Error::Authentication(message)) => {
                assert_eq!(message, "Please refresh the page")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_count_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/v2/users/42/posts"))
            .and(query_param("limit", "1"))
            .and(query_param("counters", "1"))
            .and(query_param("format", "infinite"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"list":[],"hasMore":true,"counters":{"postsCount":120}}"#,
            ))
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        assert_eq!(api.count_posts(42).await.unwrap(), 120);
    }

    #[tokio::test]
    async fn test_license_request_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/v2/users/media/5/drm/post/6"))
            .and(query_param("type", "widevine"))
            .and(header_exists("sign"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![8u8, 2, 18, 0]))
            .expect(1)
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        let license = api.request_license(5, 6, vec![1, 2, 3]).await.unwrap();
        assert_eq!(license, vec![8u8, 2, 18, 0]);
    }

    #[tokio::test]
    async fn test_license_refusal_is_item_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/v2/users/media/5/drm/post/6"))
            .respond_with(ResponseTemplate::new(403).set_body_string("not allowed for this media"))
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        let err = api.request_license(5, 6, vec![1]).await.unwrap_err();
        match &err {
            Error::License(message) => assert!(message.contains("403")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_unrecognised_subscriptions_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/v2/subscriptions/subscribes"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"unexpected":true}"#))
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        assert!(matches!(
            api.list_active_subscriptions().await,
            Err(Error::Api(_))
        ));
    }

    #[tokio::test]
    async fn test_count_without_counters_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/v2/users/42/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"list":[],"hasMore":false}"#))
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        assert!(matches!(api.count_posts(42).await, Err(Error::Api(_))));
    }

    #[tokio::test]
    async fn test_download_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = OnlyFansApi::new(&format!("{}/api2/v2", server.uri()), test_signer()).unwrap();
        let result = api
            .download(&format!("{}/missing.jpg", server.uri()), None)
            .await;
        assert!(matches!(result, Err(Error::Download(_))));
    }
}
