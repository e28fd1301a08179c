use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::feed::Feed;

const FALLBACK_IMAGE_MIME: &str = "image/jpeg";
const MAX_AVATAR_SIZE: usize = 512 * 1024;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not fetch `{url}`")]
    Transport {
        url: Url,

        #[source]
        source: reqwest::Error,
    },

    #[error("the feed API responded with {status} to `{url}`")]
    Status { url: Url, status: StatusCode },

    #[error("could not decode the feed returned by `{url}`")]
    Decode {
        url: Url,

        #[source]
        source: serde_json::Error,
    },
}

/// Something that can produce the current feed of a Medium user.
pub trait FeedSource {
    fn fetch(&self, username: &str) -> impl Future<Output = Result<Feed, FetchError>> + Send;
}

/// Fetches feeds from an RSS-to-JSON API.
pub struct FeedClient {
    http_client: reqwest::Client,
    api_url: Url,
    feed_url_prefix: String,
    fetch_timeout: Duration,
    embed_avatar: bool,
}

impl FeedClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let api_url = Url::parse(&cfg.feed_api_url)
            .with_context(|| anyhow!("invalid feed API URL `{}`", cfg.feed_api_url))?;
        let http_client = reqwest::Client::builder()
            .timeout(cfg.fetch_timeout.into())
            .user_agent(concat!("readme-cards/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("could not create an HTTP client")?;

        Ok(Self {
            http_client,
            api_url,
            feed_url_prefix: cfg.feed_url_prefix.clone(),
            fetch_timeout: cfg.fetch_timeout.into(),
            embed_avatar: cfg.embed_avatar,
        })
    }

    pub fn request_url(&self, username: &str) -> Url {
        let rss_url = format!("{}{}", self.feed_url_prefix, urlencoding::encode(username));
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair("rss_url", &rss_url);

        url
    }

    /// Downloads an image of at most [`MAX_AVATAR_SIZE`] bytes within `timeout` and encodes it
    /// as a `data:` URI.
    async fn fetch_data_uri(&self, image_url: &str, timeout: Duration) -> Result<String> {
        if timeout.is_zero() {
            bail!("no time left to fetch `{image_url}`");
        }

        let mut response = self
            .http_client
            .get(image_url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| anyhow!("could not fetch `{image_url}`"))?;

        if response
            .content_length()
            .is_some_and(|len| len > MAX_AVATAR_SIZE as u64)
        {
            bail!("the image at `{image_url}` is larger than {MAX_AVATAR_SIZE} bytes");
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(FALLBACK_IMAGE_MIME)
            .to_owned();
        let mut body = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| anyhow!("could not read the image at `{image_url}`"))?
        {
            if body.len() + chunk.len() > MAX_AVATAR_SIZE {
                bail!("the image at `{image_url}` is larger than {MAX_AVATAR_SIZE} bytes");
            }

            body.extend_from_slice(&chunk);
        }

        Ok(format!("data:{mime};base64,{}", BASE64.encode(body)))
    }
}

impl FeedSource for FeedClient {
    #[instrument(level = "DEBUG", skip(self))]
    async fn fetch(&self, username: &str) -> Result<Feed, FetchError> {
        let started = Instant::now();
        let url = self.request_url(username);
        debug!(%url, "Fetching the feed");

        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();

        if status != StatusCode::OK {
            return Err(FetchError::Status { url, status });
        }

        let body = response.bytes().await.map_err(transport)?;
        let mut feed: Feed = serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;

        if self.embed_avatar && !feed.feed.image.is_empty() {
            // The avatar only gets what is left of the feed's own timeout.
            let remaining = self.fetch_timeout.saturating_sub(started.elapsed());

            match self.fetch_data_uri(&feed.feed.image, remaining).await {
                Ok(data_uri) => feed.feed.image = data_uri,
                Err(e) => warn!("Could not embed the avatar, linking to it instead: {e:#}"),
            }
        }

        info!("Retrieved {} articles", feed.items.len());

        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Duration as ConfigDuration;
    use crate::feed::tests::feed;

    fn client(server: &MockServer) -> FeedClient {
        let cfg = Config {
            feed_api_url: format!("{}/v1/api.json", server.uri()),
            fetch_timeout: ConfigDuration::from_secs(1),
            ..Default::default()
        };

        FeedClient::new(&cfg).unwrap()
    }

    #[test]
    fn builds_the_request_url() {
        let client = FeedClient::new(&Config::default()).unwrap();
        let url = client.request_url("lav.nya.verma");

        assert_eq!(url.host_str(), Some("api.rss2json.com"));
        assert_eq!(url.path(), "/v1/api.json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [(
                "rss_url".to_owned(),
                "https://medium.com/feed/@lav.nya.verma".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn fetches_and_decodes_the_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .and(query_param("rss_url", "https://medium.com/feed/@alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(feed(&["One", "Two"])))
            .expect(1)
            .mount(&server)
            .await;

        let feed = client(&server).fetch("alice").await.unwrap();

        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[1].title, "Two");
    }

    #[tokio::test]
    async fn non_ok_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "status": "error",
                "message": "Cannot download this RSS feed",
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch("nobody").await.unwrap_err();

        assert!(
            matches!(err, FetchError::Status { status, .. } if status == StatusCode::UNPROCESSABLE_ENTITY),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).fetch("alice").await.unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_error() {
        let cfg = Config {
            feed_api_url: "http://127.0.0.1:1/v1/api.json".into(),
            fetch_timeout: ConfigDuration::from_secs(1),
            ..Default::default()
        };

        let err = FeedClient::new(&cfg).unwrap().fetch("alice").await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(feed(&["Late"]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client(&server).fetch("alice").await.unwrap_err();

        assert!(
            matches!(&err, FetchError::Transport { source, .. } if source.is_timeout()),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn embeds_the_avatar() {
        let server = MockServer::start().await;
        let mut payload = feed(&["One"]);
        payload.feed.image = format!("{}/avatar.png", server.uri());

        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/avatar.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"png".to_vec()),
            )
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.embed_avatar = true;
        let feed = client.fetch("alice").await.unwrap();

        assert_eq!(feed.feed.image, "data:image/png;base64,cG5n");
    }

    #[tokio::test]
    async fn keeps_the_avatar_url_when_embedding_fails() {
        let server = MockServer::start().await;
        let mut payload = feed(&["One"]);
        payload.feed.image = format!("{}/missing.png", server.uri());

        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.embed_avatar = true;
        let feed = client.fetch("alice").await.unwrap();

        assert_eq!(feed.feed.image, payload.feed.image);
    }

    #[tokio::test]
    async fn skips_oversized_avatars() {
        let server = MockServer::start().await;
        let mut payload = feed(&["One"]);
        payload.feed.image = format!("{}/huge.png", server.uri());

        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/huge.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0u8; MAX_AVATAR_SIZE + 1]),
            )
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.embed_avatar = true;
        let feed = client.fetch("alice").await.unwrap();

        assert_eq!(feed.feed.image, payload.feed.image);
    }

    #[tokio::test]
    async fn avatar_shares_the_fetch_timeout() {
        let server = MockServer::start().await;
        let mut payload = feed(&["One"]);
        payload.feed.image = format!("{}/slow.png", server.uri());

        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(&payload)
                    .set_delay(Duration::from_millis(700)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"png".to_vec())
                    .set_delay(Duration::from_millis(700)),
            )
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.embed_avatar = true;
        let started = Instant::now();
        let feed = client.fetch("alice").await.unwrap();

        assert_eq!(feed.feed.image, payload.feed.image);
        assert!(started.elapsed() < Duration::from_millis(1300), "{:?}", started.elapsed());
    }
}
