//! Note store trait definition.

use crate::error::StoreResult;
use crate::node::{NewNode, Node, NodeId};
use crate::transaction::Transaction;

/// A hierarchical note store.
///
/// Stores own the node tree. Consumers read nodes through the query
/// methods and change them only through [`NoteStore::apply`], which makes
/// every mutation of a [`Transaction`] visible together.
///
/// # Invariants
///
/// - `root_id` always resolves to an existing node without a parent
/// - `children` returns nodes in insertion order
/// - `apply` validates every referenced node before writing anything
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing and ephemeral trees
/// - [`super::FileStore`] - JSON snapshot persisted after every transaction
pub trait NoteStore: Send + Sync {
    /// Returns the ID of the store's top-level node.
    fn root_id(&self) -> NodeId;

    /// Gets a node by ID.
    fn get(&self, id: NodeId) -> StoreResult<Option<Node>>;

    /// Returns the children of a node in order.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the parent does not exist.
    fn children(&self, id: NodeId) -> StoreResult<Vec<Node>>;

    /// Finds the first node, in tree order, carrying the tag.
    fn find_by_tag(&self, key: &str) -> StoreResult<Option<Node>>;

    /// Finds the first node, in tree order, with exactly this title.
    ///
    /// The search covers the whole store. Prefer the scoped lookups when
    /// the caller knows which subtree it owns.
    fn find_by_title(&self, title: &str) -> StoreResult<Option<Node>>;

    /// Finds the first descendant of `ancestor` whose tag `key` equals `value`.
    ///
    /// The ancestor itself is not considered.
    fn find_in_subtree_by_tag(
        &self,
        ancestor: NodeId,
        key: &str,
        value: &str,
    ) -> StoreResult<Option<Node>>;

    /// Finds the first direct child of `parent` with exactly this title.
    fn find_child_by_title(&self, parent: NodeId, title: &str) -> StoreResult<Option<Node>>;

    /// Applies a transaction atomically.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if any mutation references a node that neither
    /// exists nor is created earlier in the same transaction. In that case
    /// nothing is written.
    fn apply(&self, txn: Transaction) -> StoreResult<()>;

    /// Executes a function within a transaction.
    ///
    /// If the function returns `Ok`, the buffered mutations are applied.
    /// If it returns `Err`, they are discarded.
    fn transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Transaction) -> StoreResult<T>,
    {
        let mut txn = Transaction::new();
        let value = f(&mut txn)?;
        if !txn.is_empty() {
            self.apply(txn)?;
        }
        Ok(value)
    }

    /// Creates a single node.
    fn create_node(&self, params: NewNode) -> StoreResult<NodeId> {
        let mut txn = Transaction::new();
        let id = txn.create_node(params);
        self.apply(txn)?;
        Ok(id)
    }

    /// Sets a valued tag on one node.
    fn set_tag(&self, node: NodeId, key: &str, value: &str) -> StoreResult<()> {
        let mut txn = Transaction::new();
        txn.set_tag(node, key, value);
        self.apply(txn)
    }

    /// Sets a relation on one node.
    fn set_relation(&self, node: NodeId, name: &str, target: NodeId) -> StoreResult<()> {
        let mut txn = Transaction::new();
        txn.set_relation(node, name, target);
        self.apply(txn)
    }

    /// Replaces the content of one node.
    fn set_content(&self, node: NodeId, content: &str) -> StoreResult<()> {
        let mut txn = Transaction::new();
        txn.set_content(node, content);
        self.apply(txn)
    }
}
