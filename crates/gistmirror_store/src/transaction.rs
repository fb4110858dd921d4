//! Buffered write transactions.

use crate::node::{NewNode, NodeId};

/// A single buffered mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a node with a pre-allocated ID.
    CreateNode {
        /// ID the node will have once applied.
        id: NodeId,
        /// Creation parameters.
        params: NewNode,
    },
    /// Set (or overwrite) a tag.
    SetTag {
        /// Target node.
        node: NodeId,
        /// Tag name.
        key: String,
        /// Optional tag value.
        value: Option<String>,
    },
    /// Set (or retarget) a named relation.
    SetRelation {
        /// Source node.
        node: NodeId,
        /// Relation name.
        name: String,
        /// Target node.
        target: NodeId,
    },
    /// Replace a node's content.
    SetContent {
        /// Target node.
        node: NodeId,
        /// New content.
        content: String,
    },
}

impl Mutation {
    /// Returns the node IDs this mutation requires to already exist.
    pub(crate) fn referenced(&self) -> Vec<NodeId> {
        match self {
            Mutation::CreateNode { params, .. } => vec![params.parent],
            Mutation::SetTag { node, .. } | Mutation::SetContent { node, .. } => vec![*node],
            Mutation::SetRelation { node, target, .. } => vec![*node, *target],
        }
    }
}

/// A set of mutations that become visible together.
///
/// Nothing is written until the transaction is handed to
/// [`NoteStore::apply`](crate::NoteStore::apply). The store validates every
/// referenced node before writing anything, so a transaction is applied
/// completely or not at all.
///
/// # Example
///
/// ```rust
/// use gistmirror_store::{MemoryStore, NewNode, NoteStore};
///
/// let store = MemoryStore::new();
/// let root = store.root_id();
/// let id = store
///     .transaction(|txn| {
///         let id = txn.create_node(NewNode::new(root, "item"));
///         txn.set_tag(id, "remoteId", "g1");
///         txn.set_flag(id, "readOnly");
///         Ok(id)
///     })
///     .unwrap();
///
/// let node = store.get(id).unwrap().unwrap();
/// assert_eq!(node.tag_value("remoteId"), Some("g1"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Transaction {
    mutations: Vec<Mutation>,
}

impl Transaction {
    /// Creates an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers a node creation and returns the ID it will receive.
    pub fn create_node(&mut self, params: NewNode) -> NodeId {
        let id = NodeId::new();
        self.mutations.push(Mutation::CreateNode { id, params });
        id
    }

    /// Buffers a valued tag assignment.
    pub fn set_tag(&mut self, node: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.mutations.push(Mutation::SetTag {
            node,
            key: key.into(),
            value: Some(value.into()),
        });
    }

    /// Buffers a valueless tag assignment.
    pub fn set_flag(&mut self, node: NodeId, key: impl Into<String>) {
        self.mutations.push(Mutation::SetTag {
            node,
            key: key.into(),
            value: None,
        });
    }

    /// Buffers a relation assignment.
    pub fn set_relation(&mut self, node: NodeId, name: impl Into<String>, target: NodeId) {
        self.mutations.push(Mutation::SetRelation {
            node,
            name: name.into(),
            target,
        });
    }

    /// Buffers a content replacement.
    pub fn set_content(&mut self, node: NodeId, content: impl Into<String>) {
        self.mutations.push(Mutation::SetContent {
            node,
            content: content.into(),
        });
    }

    /// Returns true if nothing has been buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Returns the number of buffered mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns the buffered mutations in order.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub(crate) fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_node_preallocates_distinct_ids() {
        let parent = NodeId::new();
        let mut txn = Transaction::new();
        let a = txn.create_node(NewNode::new(parent, "a"));
        let b = txn.create_node(NewNode::new(parent, "b"));

        assert_ne!(a, b);
        assert_eq!(txn.len(), 2);
    }

    #[test]
    fn relation_references_both_ends() {
        let (a, b) = (NodeId::new(), NodeId::new());
        let mut txn = Transaction::new();
        txn.set_relation(a, "childOf", b);

        assert_eq!(txn.mutations()[0].referenced(), vec![a, b]);
    }

    #[test]
    fn flag_is_a_tag_without_value() {
        let node = NodeId::new();
        let mut txn = Transaction::new();
        txn.set_flag(node, "readOnly");

        assert!(matches!(
            &txn.mutations()[0],
            Mutation::SetTag { value: None, .. }
        ));
        assert_eq!(txn.mutations()[0].referenced(), vec![node]);
    }

    #[test]
    fn empty_transaction() {
        let txn = Transaction::new();
        assert!(txn.is_empty());
        assert_eq!(txn.len(), 0);
    }
}
