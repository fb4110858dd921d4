//! Mirror orchestrator.

use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::pool::FetchPool;
use crate::reconcile::{format_timestamp, needs_update, ItemOutcome, ItemReconciler, ItemReport};
use crate::schema::LAST_SYNCED;
use crate::template::ensure_template;
use chrono::Utc;
use gistmirror_remote::{RemoteApi, RemoteItem};
use gistmirror_store::{Node, NodeId, NoteStore};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No node carries the root tag; nothing was done.
    NotConfigured,
    /// The listing was processed and the root stamped.
    Completed,
}

/// An item whose reconciliation failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Remote item ID.
    pub item_id: String,
    /// Rendered error.
    pub error: String,
}

/// Result of one mirror pass.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// How the pass ended.
    pub outcome: RunOutcome,
    /// Mirror root, if one was found.
    pub root: Option<NodeId>,
    /// Resolved username.
    pub username: Option<String>,
    /// Reports of reconciled items, in listing order.
    pub items: Vec<ItemReport>,
    /// Items that failed entirely.
    pub failures: Vec<ItemFailure>,
    /// Wall time of the pass.
    pub duration: Duration,
}

impl RunReport {
    fn not_configured(duration: Duration) -> Self {
        Self {
            outcome: RunOutcome::NotConfigured,
            root: None,
            username: None,
            items: Vec::new(),
            failures: Vec::new(),
            duration,
        }
    }

    fn count(&self, outcome: ItemOutcome) -> usize {
        self.items.iter().filter(|i| i.outcome == outcome).count()
    }

    /// Number of items created.
    pub fn created(&self) -> usize {
        self.count(ItemOutcome::Created)
    }

    /// Number of items refreshed.
    pub fn updated(&self) -> usize {
        self.count(ItemOutcome::Updated)
    }

    /// Number of items left as they were.
    pub fn unchanged(&self) -> usize {
        self.count(ItemOutcome::Unchanged)
    }

    /// Number of items that failed entirely.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of files skipped across all items.
    pub fn failed_files(&self) -> usize {
        self.items.iter().map(ItemReport::failed_files).sum()
    }

    /// Returns true if every item and every file went through.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.failed_files() == 0
    }
}

/// What a pass would do to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    /// Remote item ID.
    pub item_id: String,
    /// Title the item node has or would get.
    pub title: String,
    /// Action a pass would take.
    pub action: ItemOutcome,
}

/// Read-only preview of a pass.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Mirror root.
    pub root: NodeId,
    /// Resolved username.
    pub username: String,
    /// One entry per listed item.
    pub items: Vec<PlannedItem>,
}

/// Cumulative statistics over the engine's lifetime.
#[derive(Debug, Clone, Default)]
pub struct MirrorStats {
    /// Passes that reached the end of the listing.
    pub passes_completed: u64,
    /// Items created.
    pub items_created: u64,
    /// Items refreshed.
    pub items_updated: u64,
    /// Items that failed entirely.
    pub items_failed: u64,
    /// Files skipped because their fetch failed.
    pub files_failed: u64,
    /// When the last completed pass finished.
    pub last_pass: Option<Instant>,
    /// Last pass-level error.
    pub last_error: Option<String>,
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mirrors a remote snippet collection into a note store.
///
/// Each [`run`](Self::run) is one pass: find the root, resolve the
/// username, provision the template, list the remote items and reconcile
/// every one of them. Items run as independent tasks sharing one
/// [`FetchPool`], so a failing or panicking item never takes its siblings
/// down and the pass as a whole never exceeds
/// [`MirrorConfig::max_concurrent_fetches`] raw fetches in flight.
///
/// Only one pass may run on an engine at a time.
pub struct MirrorEngine<S, R: ?Sized> {
    config: MirrorConfig,
    store: Arc<S>,
    remote: Arc<R>,
    running: AtomicBool,
    stats: RwLock<MirrorStats>,
}

impl<S, R> MirrorEngine<S, R>
where
    S: NoteStore + 'static,
    R: RemoteApi + ?Sized + 'static,
{
    /// Creates an engine.
    pub fn new(config: MirrorConfig, store: Arc<S>, remote: Arc<R>) -> Self {
        Self {
            config,
            store,
            remote,
            running: AtomicBool::new(false),
            stats: RwLock::new(MirrorStats::default()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns true while a pass is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Gets the cumulative statistics.
    pub fn stats(&self) -> MirrorStats {
        self.stats.read().clone()
    }

    /// Finds the node carrying the configured root tag.
    pub fn find_root(&self) -> MirrorResult<Option<Node>> {
        Ok(self.store.find_by_tag(&self.config.root_tag)?)
    }

    fn reconciler(&self) -> ItemReconciler<S, R> {
        ItemReconciler::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            FetchPool::new(self.config.max_concurrent_fetches),
        )
    }

    fn resolve(&self, root: &Node) -> MirrorResult<String> {
        self.config
            .resolve_username(root)
            .ok_or(MirrorError::UsernameUnresolved { root: root.id })
    }

    async fn list(&self, username: &str) -> MirrorResult<Vec<RemoteItem>> {
        self.remote.list_items(username).await.map_err(|source| {
            error!(username, error = %source, "listing remote items failed");
            MirrorError::Listing {
                username: username.to_owned(),
                source,
            }
        })
    }

    /// Runs one mirror pass.
    ///
    /// A missing root is not an error: the pass is skipped and reported as
    /// [`RunOutcome::NotConfigured`].
    ///
    /// # Errors
    ///
    /// - `AlreadyRunning` if another pass is in progress on this engine
    /// - `UsernameUnresolved` before any network call
    /// - `Listing` if the remote listing fails; no item is touched and the
    ///   root keeps its previous `lastSynced`
    /// - `Store` if provisioning the template or stamping the root fails
    ///
    /// Failures of single items or files are reported in the [`RunReport`].
    pub async fn run(&self) -> MirrorResult<RunReport> {
        let _guard = RunGuard::acquire(&self.running).ok_or(MirrorError::AlreadyRunning)?;

        let result = self.pass(Instant::now()).await;
        let mut stats = self.stats.write();
        match &result {
            Ok(report) if report.outcome == RunOutcome::Completed => {
                stats.passes_completed += 1;
                stats.items_created += report.created() as u64;
                stats.items_updated += report.updated() as u64;
                stats.items_failed += report.failed() as u64;
                stats.files_failed += report.failed_files() as u64;
                stats.last_pass = Some(Instant::now());
                stats.last_error = None;
            }
            Ok(_) => {}
            Err(err) => stats.last_error = Some(err.to_string()),
        }
        result
    }

    async fn pass(&self, started: Instant) -> MirrorResult<RunReport> {
        let Some(root) = self.find_root()? else {
            info!(tag = %self.config.root_tag, "no mirror root found, skipping pass");
            return Ok(RunReport::not_configured(started.elapsed()));
        };
        let username = self.resolve(&root)?;
        info!(root = %root.id, username = %username, "starting mirror pass");

        ensure_template(self.store.as_ref(), root.id)?;
        let items = self.list(&username).await?;

        let reconciler = self.reconciler();
        let mut handles = Vec::with_capacity(items.len());
        for item in items {
            let reconciler = reconciler.clone();
            let root_id = root.id;
            let item_id = item.id.clone();
            let handle = tokio::spawn(async move { reconciler.reconcile(root_id, &item).await });
            handles.push((item_id, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();
        for (item_id, handle) in handles {
            let err = match handle.await {
                Ok(Ok(report)) => {
                    reports.push(report);
                    continue;
                }
                Ok(Err(err)) => err,
                Err(join) => MirrorError::Task(join.to_string()),
            };
            warn!(item = %item_id, error = %err, "item reconciliation failed");
            failures.push(ItemFailure {
                item_id,
                error: err.to_string(),
            });
        }

        self.store
            .set_tag(root.id, LAST_SYNCED, &format_timestamp(Utc::now()))?;

        let report = RunReport {
            outcome: RunOutcome::Completed,
            root: Some(root.id),
            username: Some(username),
            items: reports,
            failures,
            duration: started.elapsed(),
        };
        info!(
            root = %root.id,
            created = report.created(),
            updated = report.updated(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            failed_files = report.failed_files(),
            elapsed_ms = report.duration.as_millis() as u64,
            "mirror pass finished"
        );
        Ok(report)
    }

    /// Previews a pass without writing anything.
    ///
    /// Lists the remote items and reports what [`run`](Self::run) would do
    /// with each. Returns `None` when there is no mirror root.
    pub async fn plan(&self) -> MirrorResult<Option<Plan>> {
        let Some(root) = self.find_root()? else {
            return Ok(None);
        };
        let username = self.resolve(&root)?;
        let items = self.list(&username).await?;

        let reconciler = self.reconciler();
        let mut planned = Vec::with_capacity(items.len());
        for item in &items {
            let (title, action) = match reconciler.find_local(root.id, item)? {
                None => (item.title().to_owned(), ItemOutcome::Created),
                Some(node) => {
                    let action = if needs_update(&node, item) {
                        ItemOutcome::Updated
                    } else {
                        ItemOutcome::Unchanged
                    };
                    (node.title, action)
                }
            };
            planned.push(PlannedItem {
                item_id: item.id.clone(),
                title,
                action,
            });
        }

        Ok(Some(Plan {
            root: root.id,
            username,
            items: planned,
        }))
    }
}
