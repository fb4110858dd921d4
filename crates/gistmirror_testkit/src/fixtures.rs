//! Test fixtures.
//!
//! Provides a seeded mirror setup (store + mock remote) and helpers for
//! building remote items whose file bodies the mock actually serves.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gistmirror_remote::{MockRemote, RemoteItem};
use gistmirror_store::{FileStore, MemoryStore, NewNode, Node, NodeId, NoteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Tag the engine looks for by default.
pub const ROOT_TAG: &str = "mirrorRoot";

/// Midnight UTC on the given day.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

/// `ts` shifted by `secs` seconds.
pub fn plus_secs(ts: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    ts + Duration::seconds(secs)
}

/// URL under which [`TestMirror::stock_item`] serves a file.
pub fn raw_url(item_id: &str, filename: &str) -> String {
    format!("mock://raw/{item_id}/{filename}")
}

/// An in-memory store with a mirror root, plus a mock remote.
pub struct TestMirror {
    /// The store.
    pub store: Arc<MemoryStore>,
    /// The remote.
    pub remote: Arc<MockRemote>,
    /// The mirror root node.
    pub root: NodeId,
}

impl TestMirror {
    /// Creates a mirror root titled `Gists` without a username tag.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let root = seed_root(store.as_ref(), "Gists", None);
        Self {
            store,
            remote: Arc::new(MockRemote::new()),
            root,
        }
    }

    /// Creates a mirror root tagged with `username`.
    pub fn with_username(username: &str) -> Self {
        let mirror = Self::new();
        mirror
            .store
            .set_tag(mirror.root, "username", username)
            .expect("tag root");
        mirror
    }

    /// Builds an item and makes the mock serve its files.
    ///
    /// Each file is `(filename, language, body)`; bodies are served under
    /// [`raw_url`]. The item is not added to the listing.
    pub fn stock_item(
        &self,
        id: &str,
        updated_at: DateTime<Utc>,
        files: &[(&str, Option<&str>, &str)],
    ) -> RemoteItem {
        let mut item = RemoteItem::new(id, updated_at)
            .with_html_url(format!("https://gist.example.com/{id}"));
        for (filename, language, body) in files {
            let url = raw_url(id, filename);
            self.remote.set_body(url.clone(), *body);
            item = item.with_file(*filename, *language, url);
        }
        item
    }

    /// Replaces the remote listing.
    pub fn list(&self, items: Vec<RemoteItem>) {
        self.remote.set_items(items);
    }

    /// Gets the current root node.
    pub fn root_node(&self) -> Node {
        node(self.store.as_ref(), self.root)
    }

    /// Children of the root, template included.
    pub fn root_children(&self) -> Vec<Node> {
        self.store.children(self.root).expect("root children")
    }

    /// Finds the item node mirroring `item_id`.
    pub fn item_node(&self, item_id: &str) -> Option<Node> {
        self.store
            .find_in_subtree_by_tag(self.root, "remoteId", item_id)
            .expect("subtree lookup")
    }

    /// Children of the node mirroring `item_id`.
    pub fn file_nodes(&self, item_id: &str) -> Vec<Node> {
        let item = self.item_node(item_id).expect("item node");
        self.store.children(item.id).expect("item children")
    }
}

impl Default for TestMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a mirror root under the store root and returns its ID.
pub fn seed_root<S: NoteStore>(store: &S, title: &str, username: Option<&str>) -> NodeId {
    let top = store.root_id();
    store
        .transaction(|txn| {
            let id = txn.create_node(NewNode::new(top, title));
            txn.set_flag(id, ROOT_TAG);
            if let Some(username) = username {
                txn.set_tag(id, "username", username);
            }
            Ok(id)
        })
        .expect("seed mirror root")
}

/// Gets a node that must exist.
pub fn node<S: NoteStore>(store: &S, id: NodeId) -> Node {
    store.get(id).expect("get node").expect("node exists")
}

/// A file-backed store in a temporary directory.
pub struct TempFileStore {
    /// The store.
    pub store: FileStore,
    dir: TempDir,
}

impl TempFileStore {
    /// Opens an empty store at `<tempdir>/notes.json`.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(&dir.path().join("notes.json")).expect("open store");
        Self { store, dir }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("notes.json")
    }

    /// Opens the snapshot again, as a new process would.
    pub fn reopen(&self) -> FileStore {
        FileStore::open(&self.path()).expect("reopen store")
    }
}

impl Default for TempFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TempFileStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_has_tagged_root() {
        let mirror = TestMirror::with_username("octocat");
        let root = mirror.root_node();

        assert!(root.has_tag(ROOT_TAG));
        assert_eq!(root.tag_value("username"), Some("octocat"));
        assert!(mirror.root_children().is_empty());
    }

    #[test]
    fn stock_item_serves_files_in_order() {
        let mirror = TestMirror::new();
        let item = mirror.stock_item(
            "g1",
            at(2024, 1, 1),
            &[("b.py", None, "b"), ("a.py", Some("Python"), "a")],
        );

        let names: Vec<_> = item.files.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b.py", "a.py"]);
        assert_eq!(item.files["a.py"].raw_url, raw_url("g1", "a.py"));
    }

    #[test]
    fn temp_file_store_reopens() {
        let temp = TempFileStore::new();
        let id = seed_root(&*temp, "Gists", Some("octocat"));

        let reopened = temp.reopen();
        assert_eq!(node(&reopened, id).tag_value("username"), Some("octocat"));
    }

    #[test]
    fn plus_secs_shifts() {
        assert_eq!(plus_secs(at(2024, 1, 1), 60), at(2024, 1, 1) + Duration::minutes(1));
    }
}
