//! In-memory note store.

use crate::error::{StoreError, StoreResult};
use crate::node::{Node, NodeId};
use crate::store::NoteStore;
use crate::transaction::Transaction;
use crate::tree::Tree;
use parking_lot::RwLock;

/// An in-memory note store.
///
/// This store keeps the whole tree in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral trees that don't need persistence
///
/// # Thread Safety
///
/// Reads share a lock; each applied transaction holds the write lock for
/// its whole duration, so concurrent readers never observe half of it.
///
/// # Example
///
/// ```rust
/// use gistmirror_store::{MemoryStore, NewNode, NoteStore};
///
/// let store = MemoryStore::new();
/// let id = store.create_node(NewNode::new(store.root_id(), "notes")).unwrap();
/// assert_eq!(store.children(store.root_id()).unwrap()[0].id, id);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    tree: RwLock<Tree>,
}

impl MemoryStore {
    /// Creates a store containing only a root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(Tree::new()),
        }
    }

    pub(crate) fn from_tree(tree: Tree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Returns the number of nodes, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Returns true if the store holds nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Applies a transaction and runs `after` while still holding the lock.
    pub(crate) fn apply_then<F>(&self, txn: Transaction, after: F) -> StoreResult<()>
    where
        F: FnOnce(&Tree) -> StoreResult<()>,
    {
        let mut tree = self.tree.write();
        let mut staged = tree.clone();
        staged.apply(txn)?;
        after(&staged)?;
        *tree = staged;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore for MemoryStore {
    fn root_id(&self) -> NodeId {
        self.tree.read().root()
    }

    fn get(&self, id: NodeId) -> StoreResult<Option<Node>> {
        Ok(self.tree.read().get(id).cloned())
    }

    fn children(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        self.tree.read().children(id)
    }

    fn find_by_tag(&self, key: &str) -> StoreResult<Option<Node>> {
        Ok(self.tree.read().find(|node| node.has_tag(key)).cloned())
    }

    fn find_by_title(&self, title: &str) -> StoreResult<Option<Node>> {
        Ok(self.tree.read().find(|node| node.title == title).cloned())
    }

    fn find_in_subtree_by_tag(
        &self,
        ancestor: NodeId,
        key: &str,
        value: &str,
    ) -> StoreResult<Option<Node>> {
        let tree = self.tree.read();
        if tree.get(ancestor).is_none() {
            return Err(StoreError::NodeNotFound(ancestor));
        }
        Ok(tree
            .find_below(ancestor, |node| node.tag_value(key) == Some(value))
            .cloned())
    }

    fn find_child_by_title(&self, parent: NodeId, title: &str) -> StoreResult<Option<Node>> {
        Ok(self
            .tree
            .read()
            .children(parent)?
            .into_iter()
            .find(|node| node.title == title))
    }

    fn apply(&self, txn: Transaction) -> StoreResult<()> {
        self.tree.write().apply(txn)
    }
}
