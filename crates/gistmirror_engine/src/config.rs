//! Configuration for the mirror engine.

use crate::schema::{MIRROR_ROOT_TAG, USERNAME};
use gistmirror_remote::{HttpRemote, RemoteResult, DEFAULT_API_BASE_URL};
use gistmirror_store::Node;
use std::time::Duration;

/// Environment variables consulted, in order, for the fallback identity.
///
/// The engine never reads the environment itself; callers collect these
/// into [`MirrorConfig::with_identity_fallbacks`].
pub const IDENTITY_ENV_VARS: &[&str] = &["GISTMIRROR_USERNAME", "GITHUB_USER", "USER", "USERNAME"];

/// Configuration for mirror passes.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Tag identifying the mirror root.
    pub root_tag: String,
    /// Username used when the root carries none.
    pub username: Option<String>,
    /// Ordered identities tried after `username`.
    pub identity_fallbacks: Vec<String>,
    /// Upper bound on raw fetches in flight across the whole pass.
    pub max_concurrent_fetches: usize,
    /// API endpoint of the snippet service.
    pub api_base_url: String,
    /// Listing page size.
    pub per_page: u32,
    /// Maximum listing pages per pass.
    pub max_pages: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl MirrorConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            root_tag: MIRROR_ROOT_TAG.into(),
            username: None,
            identity_fallbacks: Vec::new(),
            max_concurrent_fetches: 8,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            per_page: 100,
            max_pages: 10,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the tag identifying the mirror root.
    pub fn with_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Sets the explicit username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the ordered fallback identities.
    pub fn with_identity_fallbacks<I, T>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.identity_fallbacks = identities.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fetch concurrency bound. Zero is treated as one.
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Sets the API endpoint.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the listing page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Sets the maximum listing pages per pass.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resolves the remote username for `root`.
    ///
    /// Order: the root's `username` tag, then [`Self::username`], then each
    /// of [`Self::identity_fallbacks`]. Blank values are skipped.
    pub fn resolve_username(&self, root: &Node) -> Option<String> {
        root.tag_value(USERNAME)
            .into_iter()
            .chain(self.username.as_deref())
            .chain(self.identity_fallbacks.iter().map(String::as_str))
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(str::to_owned)
    }

    /// Builds the HTTP client described by this configuration.
    pub fn http_remote(&self) -> RemoteResult<HttpRemote> {
        Ok(HttpRemote::new(&self.api_base_url, self.request_timeout)?
            .with_per_page(self.per_page)
            .with_max_pages(self.max_pages))
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gistmirror_store::{MemoryStore, NoteStore};

    fn root_with_username(username: Option<&str>) -> Node {
        let store = MemoryStore::new();
        let root = store.root_id();
        if let Some(username) = username {
            store.set_tag(root, USERNAME, username).unwrap();
        }
        store.get(root).unwrap().unwrap()
    }

    #[test]
    fn mirror_config_builder() {
        let config = MirrorConfig::new()
            .with_root_tag("snippets")
            .with_username("octocat")
            .with_max_concurrent_fetches(0)
            .with_per_page(50)
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.root_tag, "snippets");
        assert_eq!(config.username.as_deref(), Some("octocat"));
        assert_eq!(config.max_concurrent_fetches, 1);
        assert_eq!(config.per_page, 50);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn root_tag_wins_over_configuration() {
        let config = MirrorConfig::new()
            .with_username("explicit")
            .with_identity_fallbacks(["env-user"]);

        let root = root_with_username(Some("tagged"));
        assert_eq!(config.resolve_username(&root).as_deref(), Some("tagged"));
    }

    #[test]
    fn fallback_chain_skips_blank_values() {
        let config = MirrorConfig::new().with_identity_fallbacks(["", "  ", "env-user", "later"]);

        let root = root_with_username(Some("  "));
        assert_eq!(config.resolve_username(&root).as_deref(), Some("env-user"));
    }

    #[test]
    fn explicit_username_precedes_fallbacks() {
        let config = MirrorConfig::new()
            .with_username("explicit")
            .with_identity_fallbacks(["env-user"]);

        let root = root_with_username(None);
        assert_eq!(config.resolve_username(&root).as_deref(), Some("explicit"));
    }

    #[test]
    fn nothing_resolves_to_none() {
        let root = root_with_username(None);
        assert!(MirrorConfig::new().resolve_username(&root).is_none());
    }

    #[test]
    fn http_remote_uses_configured_endpoint() {
        let config = MirrorConfig::new().with_api_base_url("https://ghe.example.com/api/v3/");
        let remote = config.http_remote().unwrap();
        assert_eq!(remote.base_url(), "https://ghe.example.com/api/v3");
    }
}
