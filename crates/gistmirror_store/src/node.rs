//! Node identifier and node records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node.
///
/// Node IDs are 128-bit UUIDs that are:
/// - Globally unique within a store
/// - Immutable once assigned
/// - Never reused
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Creates a new random node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a node ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Converts to a UUID.
    #[must_use]
    pub const fn to_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a node ID from its hyphenated string form.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the hierarchical note store.
///
/// Tags are key/optional-value pairs; relations are named single-target
/// links to other nodes. `children` keeps insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier.
    pub id: NodeId,
    /// Parent node, `None` only for the store root.
    pub parent: Option<NodeId>,
    /// Display title.
    pub title: String,
    /// Content blob.
    pub content: String,
    /// Store-level note type (`text`, `code`, ...).
    pub note_type: String,
    /// MIME type of the content.
    pub mime: String,
    /// Whether the node is protected.
    pub protected: bool,
    /// Tags keyed by name.
    #[serde(default)]
    pub tags: BTreeMap<String, Option<String>>,
    /// Named relations to other nodes.
    #[serde(default)]
    pub relations: BTreeMap<String, NodeId>,
    /// Ordered child node IDs.
    #[serde(default)]
    pub children: Vec<NodeId>,
}

impl Node {
    /// Returns true if the node carries the tag, with or without a value.
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Returns the tag's value, if the tag is present and has one.
    #[must_use]
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.get(key).and_then(|value| value.as_deref())
    }

    /// Returns true if the node has a relation with this name.
    #[must_use]
    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Returns the relation target, if any.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<NodeId> {
        self.relations.get(name).copied()
    }
}

/// Parameters for creating a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    /// Parent the node is attached under.
    pub parent: NodeId,
    /// Display title.
    pub title: String,
    /// Initial content.
    pub content: String,
    /// Store-level note type.
    pub note_type: String,
    /// MIME type.
    pub mime: String,
    /// Whether the node is protected.
    pub protected: bool,
}

impl NewNode {
    /// Creates parameters for an empty, unprotected text node.
    pub fn new(parent: NodeId, title: impl Into<String>) -> Self {
        Self {
            parent,
            title: title.into(),
            content: String::new(),
            note_type: "text".into(),
            mime: "text/html".into(),
            protected: false,
        }
    }

    /// Sets the initial content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the note type and MIME type.
    #[must_use]
    pub fn with_type(mut self, note_type: impl Into<String>, mime: impl Into<String>) -> Self {
        self.note_type = note_type.into();
        self.mime = mime.into();
        self
    }

    /// Sets the protected flag.
    #[must_use]
    pub fn with_protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    pub(crate) fn into_node(self, id: NodeId) -> Node {
        Node {
            id,
            parent: Some(self.parent),
            title: self.title,
            content: self.content,
            note_type: self.note_type,
            mime: self.mime,
            protected: self.protected,
            tags: BTreeMap::new(),
            relations: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_roundtrips_through_string() {
        let id = NodeId::new();
        assert_eq!(NodeId::parse(&id.to_string()), Some(id));
        assert_eq!(NodeId::parse("not-a-uuid"), None);
    }

    #[test]
    fn tag_lookup_distinguishes_valueless_tags() {
        let parent = NodeId::new();
        let mut node = NewNode::new(parent, "n").into_node(NodeId::new());
        node.tags.insert("readOnly".into(), None);
        node.tags.insert("remoteId".into(), Some("g1".into()));

        assert!(node.has_tag("readOnly"));
        assert_eq!(node.tag_value("readOnly"), None);
        assert_eq!(node.tag_value("remoteId"), Some("g1"));
        assert!(!node.has_tag("missing"));
    }

    #[test]
    fn new_node_builder() {
        let parent = NodeId::new();
        let params = NewNode::new(parent, "a.py")
            .with_content("print(1)")
            .with_type("code", "text/x-python");

        let node = params.into_node(NodeId::new());
        assert_eq!(node.parent, Some(parent));
        assert_eq!(node.content, "print(1)");
        assert_eq!(node.note_type, "code");
        assert_eq!(node.mime, "text/x-python");
        assert!(!node.protected);
        assert!(node.children.is_empty());
    }
}
