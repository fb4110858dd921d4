//! Bounded pool for raw file fetches.

use gistmirror_remote::{RemoteApi, RemoteError, RemoteResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One raw fetch to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Filename the body belongs to.
    pub filename: String,
    /// URL of the raw body.
    pub url: String,
}

/// Result of one raw fetch.
#[derive(Debug)]
pub struct Fetched {
    /// Filename the body belongs to.
    pub filename: String,
    /// Fetched body or the reason it is missing.
    pub body: RemoteResult<String>,
}

/// Bounds the number of raw fetches in flight.
///
/// Clones share one semaphore, so a single pool handed to every item of a
/// pass bounds the pass as a whole.
#[derive(Debug, Clone)]
pub struct FetchPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl FetchPool {
    /// Creates a pool allowing `limit` concurrent fetches. Zero is treated as one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Returns the concurrency bound.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Fetches every request and waits for all of them.
    ///
    /// Results come back in request order regardless of completion order.
    /// A failed or panicked fetch only affects its own slot.
    pub async fn fetch_all<R>(&self, remote: Arc<R>, requests: Vec<FetchRequest>) -> Vec<Fetched>
    where
        R: RemoteApi + ?Sized + 'static,
    {
        let mut slots: Vec<Option<RemoteResult<String>>> =
            requests.iter().map(|_| None).collect();
        let mut join_set = JoinSet::new();

        for (index, request) in requests.iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let remote = Arc::clone(&remote);
            let url = request.url.clone();

            join_set.spawn(async move {
                let body = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let body = remote.fetch_raw(&url).await;
                        drop(permit);
                        body
                    }
                    Err(_) => Err(RemoteError::transport_fatal("fetch pool closed")),
                };
                (index, body)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            if let Ok((index, body)) = joined {
                slots[index] = Some(body);
            }
        }

        requests
            .into_iter()
            .zip(slots)
            .map(|(request, slot)| Fetched {
                filename: request.filename,
                body: slot.unwrap_or_else(|| {
                    Err(RemoteError::transport_fatal("fetch task panicked"))
                }),
            })
            .collect()
    }
}
