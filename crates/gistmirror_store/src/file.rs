//! File-backed note store.

use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::node::{Node, NodeId};
use crate::store::NoteStore;
use crate::transaction::Transaction;
use crate::tree::{Snapshot, Tree};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A note store persisted as a JSON snapshot.
///
/// The whole tree is loaded on open and rewritten after every applied
/// transaction. A transaction only becomes visible in memory once its
/// snapshot has been written.
///
/// # Durability
///
/// Uses write-then-rename for crash safety:
/// 1. Write the snapshot to a temporary sibling file
/// 2. Sync the temporary file to disk
/// 3. Rename it over the snapshot path
///
/// # Example
///
/// ```no_run
/// use gistmirror_store::{FileStore, NewNode, NoteStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("notes.json")).unwrap();
/// store.create_node(NewNode::new(store.root_id(), "inbox")).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens the snapshot at `path`, or starts an empty store if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded, or
    /// if an empty store cannot be written.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let tree = if path.exists() {
            let data = fs::read(path)?;
            let snapshot: Snapshot = serde_json::from_slice(&data)?;
            Tree::from_snapshot(snapshot)?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let tree = Tree::new();
            write_snapshot(path, &tree)?;
            tree
        };

        debug!(path = %path.display(), nodes = tree.len(), "opened note store");

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_tree(tree),
        })
    }

    /// Returns the path to the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of nodes, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the store holds nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn write_snapshot(path: &Path, tree: &Tree) -> StoreResult<()> {
    let temp_path = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(&tree.to_snapshot())?;

    let mut file = File::create(&temp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

impl NoteStore for FileStore {
    fn root_id(&self) -> NodeId {
        self.inner.root_id()
    }

    fn get(&self, id: NodeId) -> StoreResult<Option<Node>> {
        self.inner.get(id)
    }

    fn children(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        self.inner.children(id)
    }

    fn find_by_tag(&self, key: &str) -> StoreResult<Option<Node>> {
        self.inner.find_by_tag(key)
    }

    fn find_by_title(&self, title: &str) -> StoreResult<Option<Node>> {
        self.inner.find_by_title(title)
    }

    fn find_in_subtree_by_tag(
        &self,
        ancestor: NodeId,
        key: &str,
        value: &str,
    ) -> StoreResult<Option<Node>> {
        self.inner.find_in_subtree_by_tag(ancestor, key, value)
    }

    fn find_child_by_title(&self, parent: NodeId, title: &str) -> StoreResult<Option<Node>> {
        self.inner.find_child_by_title(parent, title)
    }

    fn apply(&self, txn: Transaction) -> StoreResult<()> {
        self.inner
            .apply_then(txn, |tree| write_snapshot(&self.path, tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::node::NewNode;
    use tempfile::tempdir;

    #[test]
    fn file_open_creates_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.json");

        let store = FileStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn file_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let (root, id) = {
            let store = FileStore::open(&path).unwrap();
            let root = store.root_id();
            let id = store
                .transaction(|txn| {
                    let id = txn.create_node(NewNode::new(root, "mirror"));
                    txn.set_tag(id, "mirrorRoot", "");
                    txn.set_flag(id, "readOnly");
                    Ok(id)
                })
                .unwrap();
            (root, id)
        };

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.root_id(), root);
        let node = store.get(id).unwrap().unwrap();
        assert!(node.has_tag("readOnly"));
        assert_eq!(store.children(root).unwrap().len(), 1);
    }

    #[test]
    fn file_failed_transaction_is_not_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let store = FileStore::open(&path).unwrap();

        let mut txn = Transaction::new();
        txn.create_node(NewNode::new(store.root_id(), "x"));
        txn.set_content(NodeId::new(), "dangling");
        assert!(store.apply(txn).is_err());

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn file_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }
}
