//! Reconciliation of one remote item into the mirror subtree.

use crate::error::MirrorResult;
use crate::pool::{FetchPool, FetchRequest, Fetched};
use crate::schema::{
    CHILD_OF, ICON_CLASS, ITEM_ICON, LAST_SYNCED, READ_ONLY, REMOTE_ID, REMOTE_UPDATED_AT,
    REMOTE_URL, TEMPLATE,
};
use crate::type_map::map_type;
use chrono::{DateTime, SecondsFormat, Utc};
use gistmirror_remote::{RemoteApi, RemoteItem};
use gistmirror_store::{NewNode, Node, NodeId, NoteStore, Transaction};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What reconciliation did with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A new item node was created.
    Created,
    /// An existing item node was refreshed.
    Updated,
    /// The local node already reflects this version.
    Unchanged,
}

/// What happened to one file of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// A new file node was created.
    Created,
    /// An existing file node's content was overwritten.
    Updated,
    /// The body could not be fetched; the file was skipped.
    Failed(String),
}

/// Per-file result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Filename.
    pub filename: String,
    /// Result for this file.
    pub status: FileStatus,
}

/// Result of reconciling one item.
#[derive(Debug, Clone)]
pub struct ItemReport {
    /// Remote item ID.
    pub item_id: String,
    /// Local item node.
    pub node_id: NodeId,
    /// Overall outcome.
    pub outcome: ItemOutcome,
    /// Per-file results, in the item's file order.
    pub files: Vec<FileReport>,
}

impl ItemReport {
    /// Number of files that could not be fetched.
    pub fn failed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count()
    }

    /// Returns true if every file made it into the store.
    pub fn is_complete(&self) -> bool {
        self.failed_files() == 0
    }
}

/// Formats a timestamp the way it is stored in tags.
///
/// Sub-second parts are kept so a stored version compares equal to the
/// remote timestamp it came from.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Remote version the node reflects; the epoch when unknown or unparsable.
pub fn synced_version(node: &Node) -> DateTime<Utc> {
    node.tag_value(REMOTE_UPDATED_AT)
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Returns true if `item` is strictly newer than what `node` reflects.
pub fn needs_update(node: &Node, item: &RemoteItem) -> bool {
    item.updated_at > synced_version(node)
}

/// Reconciles remote items into the subtree of a mirror root.
pub struct ItemReconciler<S, R: ?Sized> {
    store: Arc<S>,
    remote: Arc<R>,
    pool: FetchPool,
}

impl<S, R: ?Sized> Clone for ItemReconciler<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            remote: Arc::clone(&self.remote),
            pool: self.pool.clone(),
        }
    }
}

impl<S, R> ItemReconciler<S, R>
where
    S: NoteStore + 'static,
    R: RemoteApi + ?Sized + 'static,
{
    /// Creates a reconciler.
    pub fn new(store: Arc<S>, remote: Arc<R>, pool: FetchPool) -> Self {
        Self {
            store,
            remote,
            pool,
        }
    }

    /// Finds the local node mirroring `item` under `root_id`.
    ///
    /// Looks up the `remoteId` index of the subtree first, then the root's
    /// direct children by title. A title match is only taken when it mirrors
    /// no item yet. Nothing outside the subtree is considered, nor is the
    /// root's template node.
    pub fn find_local(&self, root_id: NodeId, item: &RemoteItem) -> MirrorResult<Option<Node>> {
        if let Some(node) = self
            .store
            .find_in_subtree_by_tag(root_id, REMOTE_ID, &item.id)?
        {
            return Ok(Some(node));
        }

        let template = self.store.get(root_id)?.and_then(|r| r.relation(TEMPLATE));
        Ok(self
            .store
            .find_child_by_title(root_id, item.title())?
            .filter(|node| Some(node.id) != template && !node.has_tag(REMOTE_ID)))
    }

    /// Brings the mirror of `item` up to date.
    ///
    /// Creates the item node and its file nodes on first sight. Afterwards
    /// the node is refreshed only when the item is strictly newer than the
    /// version recorded in `remoteUpdatedAt`; otherwise nothing is fetched or
    /// written. File bodies are fetched before any write and each pass over
    /// an item is committed as one transaction. A file that fails to fetch is
    /// skipped and reported; `remoteUpdatedAt` then stays behind so the next
    /// pass retries the item.
    pub async fn reconcile(&self, root_id: NodeId, item: &RemoteItem) -> MirrorResult<ItemReport> {
        match self.find_local(root_id, item)? {
            None => self.create(root_id, item).await,
            Some(node) if needs_update(&node, item) => self.update(&node, item).await,
            Some(node) => {
                debug!(item = %item.id, node = %node.id, "item unchanged");
                Ok(ItemReport {
                    item_id: item.id.clone(),
                    node_id: node.id,
                    outcome: ItemOutcome::Unchanged,
                    files: Vec::new(),
                })
            }
        }
    }

    async fn fetch_files(&self, item: &RemoteItem) -> Vec<Fetched> {
        let requests = item
            .files
            .iter()
            .map(|(filename, file)| FetchRequest {
                filename: filename.clone(),
                url: file.raw_url.clone(),
            })
            .collect();
        self.pool
            .fetch_all(Arc::clone(&self.remote), requests)
            .await
    }

    async fn create(&self, root_id: NodeId, item: &RemoteItem) -> MirrorResult<ItemReport> {
        let fetched = self.fetch_files(item).await;
        let complete = fetched.iter().all(|f| f.body.is_ok());
        let now = format_timestamp(Utc::now());

        let mut files = Vec::with_capacity(fetched.len());
        let node_id = self.store.transaction(|txn| {
            let id = txn.create_node(NewNode::new(root_id, item.title()));
            txn.set_tag(id, REMOTE_ID, item.id.as_str());
            txn.set_tag(id, REMOTE_URL, item.html_url.as_str());
            txn.set_tag(id, ICON_CLASS, ITEM_ICON);
            txn.set_tag(id, LAST_SYNCED, now.as_str());
            txn.set_flag(id, READ_ONLY);
            if complete {
                txn.set_tag(id, REMOTE_UPDATED_AT, format_timestamp(item.updated_at));
            }

            for file in fetched {
                let status = match file.body {
                    Ok(body) => {
                        create_file_node(txn, id, item, &file.filename, body);
                        FileStatus::Created
                    }
                    Err(err) => failed(item, &file.filename, err.to_string()),
                };
                files.push(FileReport {
                    filename: file.filename,
                    status,
                });
            }
            Ok(id)
        })?;

        info!(
            item = %item.id,
            node = %node_id,
            files = files.len(),
            complete,
            "created mirrored item"
        );
        Ok(ItemReport {
            item_id: item.id.clone(),
            node_id,
            outcome: ItemOutcome::Created,
            files,
        })
    }

    async fn update(&self, node: &Node, item: &RemoteItem) -> MirrorResult<ItemReport> {
        let fetched = self.fetch_files(item).await;
        let complete = fetched.iter().all(|f| f.body.is_ok());
        let children = self.store.children(node.id)?;
        let now = format_timestamp(Utc::now());

        let mut files = Vec::with_capacity(fetched.len());
        self.store.transaction(|txn| {
            for file in fetched {
                let status = match file.body {
                    Ok(body) => match children.iter().find(|c| c.title == file.filename) {
                        Some(child) => {
                            txn.set_content(child.id, body);
                            FileStatus::Updated
                        }
                        None => {
                            create_file_node(txn, node.id, item, &file.filename, body);
                            FileStatus::Created
                        }
                    },
                    Err(err) => failed(item, &file.filename, err.to_string()),
                };
                files.push(FileReport {
                    filename: file.filename,
                    status,
                });
            }

            if !node.has_tag(REMOTE_ID) {
                txn.set_tag(node.id, REMOTE_ID, item.id.as_str());
            }
            txn.set_tag(node.id, LAST_SYNCED, now.as_str());
            if complete {
                txn.set_tag(node.id, REMOTE_UPDATED_AT, format_timestamp(item.updated_at));
            }
            Ok(())
        })?;

        info!(
            item = %item.id,
            node = %node.id,
            files = files.len(),
            complete,
            "updated mirrored item"
        );
        Ok(ItemReport {
            item_id: item.id.clone(),
            node_id: node.id,
            outcome: ItemOutcome::Updated,
            files,
        })
    }
}

fn create_file_node(
    txn: &mut Transaction,
    parent: NodeId,
    item: &RemoteItem,
    filename: &str,
    body: String,
) {
    let language = item
        .files
        .get(filename)
        .and_then(|file| file.language.as_deref());
    let kind = map_type(language);

    let id = txn.create_node(
        NewNode::new(parent, filename)
            .with_content(body)
            .with_type(kind.note_type, kind.mime),
    );
    txn.set_tag(id, ICON_CLASS, kind.icon);
    txn.set_relation(id, CHILD_OF, parent);
}

fn failed(item: &RemoteItem, filename: &str, reason: String) -> FileStatus {
    warn!(item = %item.id, file = filename, error = %reason, "skipping file");
    FileStatus::Failed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gistmirror_store::MemoryStore;

    fn node_with(tags: &[(&str, &str)]) -> Node {
        let store = MemoryStore::new();
        let id = store.root_id();
        for (key, value) in tags {
            store.set_tag(id, key, value).unwrap();
        }
        store.get(id).unwrap().unwrap()
    }

    fn item_at(secs: i64) -> RemoteItem {
        RemoteItem::new("g1", Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn synced_version_defaults_to_epoch() {
        assert_eq!(synced_version(&node_with(&[])), DateTime::UNIX_EPOCH);
        assert_eq!(
            synced_version(&node_with(&[(REMOTE_UPDATED_AT, "yesterday")])),
            DateTime::UNIX_EPOCH
        );
    }

    #[test]
    fn update_gate_is_strict() {
        let node = node_with(&[(REMOTE_UPDATED_AT, "2024-01-01T00:00:00Z")]);
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp();

        assert!(!needs_update(&node, &item_at(stamp)));
        assert!(!needs_update(&node, &item_at(stamp - 1)));
        assert!(needs_update(&node, &item_at(stamp + 1)));
    }

    #[test]
    fn timestamps_are_utc_with_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn fractional_version_is_not_newer_than_itself() {
        let ts = Utc.timestamp_opt(1_704_067_200, 500_000_000).unwrap();
        let stamp = format_timestamp(ts);
        assert_eq!(stamp, "2024-01-01T00:00:00.500Z");

        let node = node_with(&[(REMOTE_UPDATED_AT, stamp.as_str())]);
        assert_eq!(synced_version(&node), ts);
        assert!(!needs_update(&node, &RemoteItem::new("g1", ts)));
    }

    #[test]
    fn report_counts_failures() {
        let report = ItemReport {
            item_id: "g1".into(),
            node_id: NodeId::new(),
            outcome: ItemOutcome::Created,
            files: vec![
                FileReport {
                    filename: "a.py".into(),
                    status: FileStatus::Created,
                },
                FileReport {
                    filename: "b.py".into(),
                    status: FileStatus::Failed("HTTP 500".into()),
                },
            ],
        };
        assert_eq!(report.failed_files(), 1);
        assert!(!report.is_complete());
    }
}
