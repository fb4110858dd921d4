//! Node tree shared by the store implementations.

use crate::error::{StoreError, StoreResult};
use crate::node::{Node, NodeId};
use crate::transaction::{Mutation, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

const ROOT_TITLE: &str = "root";

/// In-memory node tree.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

/// Serialized form of a [`Tree`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub(crate) root: NodeId,
    pub(crate) nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        let root = NodeId::new();
        let node = Node {
            id: root,
            parent: None,
            title: ROOT_TITLE.into(),
            content: String::new(),
            note_type: "text".into(),
            mime: "text/html".into(),
            protected: false,
            tags: BTreeMap::new(),
            relations: BTreeMap::new(),
            children: Vec::new(),
        };
        let mut nodes = HashMap::new();
        nodes.insert(root, node);
        Self { root, nodes }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn children(&self, id: NodeId) -> StoreResult<Vec<Node>> {
        let parent = self.nodes.get(&id).ok_or(StoreError::NodeNotFound(id))?;
        Ok(parent
            .children
            .iter()
            .filter_map(|child| self.nodes.get(child).cloned())
            .collect())
    }

    /// Depth-first search below `start`, in child order, excluding `start`.
    pub(crate) fn find_below<P>(&self, start: NodeId, predicate: P) -> Option<&Node>
    where
        P: Fn(&Node) -> bool,
    {
        let mut stack: Vec<NodeId> = match self.nodes.get(&start) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return None,
        };

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if predicate(node) {
                return Some(node);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Finds a node anywhere in the tree, the root included.
    pub(crate) fn find<P>(&self, predicate: P) -> Option<&Node>
    where
        P: Fn(&Node) -> bool,
    {
        let root = self.nodes.get(&self.root)?;
        if predicate(root) {
            return Some(root);
        }
        self.find_below(self.root, predicate)
    }

    /// Applies a transaction. Validation runs before the first write.
    pub(crate) fn apply(&mut self, txn: Transaction) -> StoreResult<()> {
        let mutations = txn.into_mutations();
        self.validate(&mutations)?;

        for mutation in mutations {
            match mutation {
                Mutation::CreateNode { id, params } => {
                    let parent = params.parent;
                    self.nodes.insert(id, params.into_node(id));
                    if let Some(parent) = self.nodes.get_mut(&parent) {
                        parent.children.push(id);
                    }
                }
                Mutation::SetTag { node, key, value } => {
                    if let Some(node) = self.nodes.get_mut(&node) {
                        node.tags.insert(key, value);
                    }
                }
                Mutation::SetRelation { node, name, target } => {
                    if let Some(node) = self.nodes.get_mut(&node) {
                        node.relations.insert(name, target);
                    }
                }
                Mutation::SetContent { node, content } => {
                    if let Some(node) = self.nodes.get_mut(&node) {
                        node.content = content;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate(&self, mutations: &[Mutation]) -> StoreResult<()> {
        let mut created = HashSet::new();
        for mutation in mutations {
            for id in mutation.referenced() {
                if !self.nodes.contains_key(&id) && !created.contains(&id) {
                    return Err(StoreError::NodeNotFound(id));
                }
            }
            if let Mutation::CreateNode { id, .. } = mutation {
                created.insert(*id);
            }
        }
        Ok(())
    }

    pub(crate) fn to_snapshot(&self) -> Snapshot {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by_key(|node| node.id);
        Snapshot {
            root: self.root,
            nodes,
        }
    }

    pub(crate) fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let nodes: HashMap<NodeId, Node> = snapshot
            .nodes
            .into_iter()
            .map(|node| (node.id, node))
            .collect();

        let root = nodes
            .get(&snapshot.root)
            .ok_or_else(|| StoreError::Corrupted(format!("root {} missing", snapshot.root)))?;
        if root.parent.is_some() {
            return Err(StoreError::Corrupted("root node has a parent".into()));
        }

        for node in nodes.values() {
            if let Some(parent) = node.parent {
                if !nodes.contains_key(&parent) {
                    return Err(StoreError::Corrupted(format!(
                        "node {} references missing parent {}",
                        node.id, parent
                    )));
                }
            }
            if let Some(child) = node.children.iter().find(|c| !nodes.contains_key(c)) {
                return Err(StoreError::Corrupted(format!(
                    "node {} references missing child {}",
                    node.id, child
                )));
            }
        }

        Ok(Self {
            root: snapshot.root,
            nodes,
        })
    }
}
