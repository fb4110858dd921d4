//! In-memory remote for tests.

use crate::client::RemoteApi;
use crate::error::{RemoteError, RemoteResult};
use crate::item::RemoteItem;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A mock remote collection for testing.
///
/// Serves a fixed listing and a URL→body map, can be told to fail the
/// listing or individual URLs, and counts every call it receives.
#[derive(Debug, Default)]
pub struct MockRemote {
    items: Mutex<Vec<RemoteItem>>,
    bodies: Mutex<HashMap<String, String>>,
    failing_urls: Mutex<HashSet<String>>,
    listing_status: Mutex<Option<u16>>,
    latency: Mutex<Duration>,
    listing_calls: AtomicUsize,
    raw_fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRemote {
    /// Creates an empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the listing.
    pub fn set_items(&self, items: Vec<RemoteItem>) {
        *self.items.lock() = items;
    }

    /// Serves `body` for `url`.
    pub fn set_body(&self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.lock().insert(url.into(), body.into());
    }

    /// Makes fetches of `url` answer with HTTP 500.
    pub fn fail_url(&self, url: impl Into<String>) {
        self.failing_urls.lock().insert(url.into());
    }

    /// Makes fetches of `url` succeed again.
    pub fn restore_url(&self, url: &str) {
        self.failing_urls.lock().remove(url);
    }

    /// Makes the listing answer with `status`, or succeed again with `None`.
    pub fn set_listing_status(&self, status: Option<u16>) {
        *self.listing_status.lock() = status;
    }

    /// Delays every raw fetch, so concurrent fetches overlap.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Number of listing calls received.
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Number of raw fetches received, failed ones included.
    pub fn raw_fetches(&self) -> usize {
        self.raw_fetches.load(Ordering::SeqCst)
    }

    /// Highest number of raw fetches observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Resets the call counters.
    pub fn reset_counters(&self) {
        self.listing_calls.store(0, Ordering::SeqCst);
        self.raw_fetches.store(0, Ordering::SeqCst);
        self.max_in_flight.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn list_items(&self, username: &str) -> RemoteResult<Vec<RemoteItem>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.listing_status.lock() {
            return Err(RemoteError::Status {
                url: format!("mock://users/{username}/gists"),
                status,
            });
        }
        Ok(self.items.lock().clone())
    }

    async fn fetch_raw(&self, url: &str) -> RemoteResult<String> {
        self.raw_fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_urls.lock().contains(url) {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        self.bodies
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn mock_serves_listing_and_bodies() {
        let remote = MockRemote::new();
        remote.set_items(vec![RemoteItem::new("g1", Utc::now())]);
        remote.set_body("u1", "print(1)");

        assert_eq!(remote.list_items("octocat").await.unwrap().len(), 1);
        assert_eq!(remote.fetch_raw("u1").await.unwrap(), "print(1)");
        assert!(matches!(
            remote.fetch_raw("u2").await,
            Err(RemoteError::NotFound(_))
        ));
        assert_eq!(remote.listing_calls(), 1);
        assert_eq!(remote.raw_fetches(), 2);
    }

    #[tokio::test]
    async fn mock_failures() {
        let remote = MockRemote::new();
        remote.set_body("u1", "x");
        remote.fail_url("u1");
        remote.set_listing_status(Some(502));

        assert!(matches!(
            remote.fetch_raw("u1").await,
            Err(RemoteError::Status { status: 500, .. })
        ));
        assert!(matches!(
            remote.list_items("octocat").await,
            Err(RemoteError::Status { status: 502, .. })
        ));

        remote.set_listing_status(None);
        assert!(remote.list_items("octocat").await.is_ok());
    }

    #[tokio::test]
    async fn mock_reset_counters() {
        let remote = MockRemote::new();
        let _ = remote.fetch_raw("u").await;
        remote.reset_counters();
        assert_eq!(remote.raw_fetches(), 0);
        assert_eq!(remote.max_in_flight(), 0);
    }
}
