//! Remote collection client.
//!
//! The engine talks to the snippet service through [`RemoteApi`]. The
//! production implementation is [`HttpRemote`]; tests use
//! [`MockRemote`](crate::MockRemote).

use crate::error::{RemoteError, RemoteResult};
use crate::item::RemoteItem;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint of the snippet service.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

const LISTING_ACCEPT: &str = "application/vnd.github+json";
const RAW_ACCEPT: &str = "text/plain";

/// Access to a user's remote snippet collection.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Lists every item owned by `username`.
    ///
    /// # Errors
    ///
    /// Fails if any listing request fails or answers with a non-2xx status.
    async fn list_items(&self, username: &str) -> RemoteResult<Vec<RemoteItem>>;

    /// Fetches the raw body of one file.
    async fn fetch_raw(&self, url: &str) -> RemoteResult<String>;
}

/// HTTP-based remote client.
pub struct HttpRemote {
    /// Base URL of the API (e.g., "https://api.github.com").
    base_url: String,
    client: Client,
    per_page: u32,
    max_pages: u32,
    /// Last error message.
    last_error: RwLock<Option<String>>,
}

impl HttpRemote {
    /// Creates a client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::transport_fatal(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            per_page: 100,
            max_pages: 10,
            last_error: RwLock::new(None),
        })
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Sets the maximum number of listing pages fetched per call.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Builds the URL of one listing page. The username is percent-encoded
    /// as a single path segment.
    fn listing_url(&self, username: &str, page: u32) -> RemoteResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RemoteError::transport_fatal(format!("invalid base URL {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::transport_fatal(format!(
                    "base URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["users", username, "gists"]);
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn get(&self, url: &str, accept: &str) -> RemoteResult<reqwest::Response> {
        let result = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, concat!("gistmirror/", env!("CARGO_PKG_VERSION")))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                let err = RemoteError::from(err);
                *self.last_error.write() = Some(err.to_string());
                return Err(err);
            }
        };

        let status = response.status();
        debug!(url, status = status.as_u16(), "remote request");
        if !status.is_success() {
            let err = RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
            *self.last_error.write() = Some(err.to_string());
            return Err(err);
        }

        *self.last_error.write() = None;
        Ok(response)
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn list_items(&self, username: &str) -> RemoteResult<Vec<RemoteItem>> {
        let mut items = Vec::new();

        for page in 1..=self.max_pages {
            let url = self.listing_url(username, page)?;
            let response = self.get(url.as_str(), LISTING_ACCEPT).await?;
            let batch: Vec<RemoteItem> =
                response.json().await.map_err(|e| RemoteError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            let short_page = batch.len() < self.per_page as usize;
            items.extend(batch);
            if short_page {
                break;
            }
        }

        Ok(items)
    }

    async fn fetch_raw(&self, url: &str) -> RemoteResult<String> {
        let response = self.get(url, RAW_ACCEPT).await?;
        response.text().await.map_err(|e| RemoteError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_creation_trims_base_url() {
        let remote = HttpRemote::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(remote.base_url(), "https://api.example.com");
        assert!(remote.last_error().is_none());
    }

    #[test]
    fn listing_url_carries_pagination() {
        let remote = HttpRemote::new(DEFAULT_API_BASE_URL, Duration::from_secs(5))
            .unwrap()
            .with_per_page(30);

        assert_eq!(
            remote.listing_url("octocat", 2).unwrap().as_str(),
            "https://api.github.com/users/octocat/gists?per_page=30&page=2"
        );
    }

    #[test]
    fn listing_url_escapes_the_username() {
        let remote = HttpRemote::new(DEFAULT_API_BASE_URL, Duration::from_secs(5)).unwrap();
        let url = remote.listing_url("a b/c?x", 1).unwrap();

        assert_eq!(url.path(), "/users/a%20b%2Fc%3Fx/gists");
        assert_eq!(url.query(), Some("per_page=100&page=1"));
    }

    #[test]
    fn listing_url_keeps_a_base_path() {
        let remote =
            HttpRemote::new("https://ghe.example.com/api/v3/", Duration::from_secs(5)).unwrap();

        assert_eq!(
            remote.listing_url("octocat", 1).unwrap().as_str(),
            "https://ghe.example.com/api/v3/users/octocat/gists?per_page=100&page=1"
        );
    }

    #[test]
    fn page_settings_are_clamped() {
        let remote = HttpRemote::new(DEFAULT_API_BASE_URL, Duration::from_secs(5))
            .unwrap()
            .with_per_page(0)
            .with_max_pages(0);

        assert_eq!(remote.per_page, 1);
        assert_eq!(remote.max_pages, 1);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let remote = HttpRemote::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let result = remote.fetch_raw("http://127.0.0.1:9/raw/a.py").await;
        assert!(matches!(result, Err(RemoteError::Transport { .. })));
        assert!(remote.last_error().is_some());
    }
}
