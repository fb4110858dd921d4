//! # gistmirror store
//!
//! Hierarchical note store contract consumed by the gistmirror engine.
//!
//! The engine never owns the tree. It reads nodes through [`NoteStore`] and
//! changes them only through [`Transaction`]s, which the store applies
//! atomically: every tag and relation of one construction becomes visible
//! together or not at all.
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral trees
//! - [`FileStore`] - JSON snapshot persisted after every transaction
//!
//! ## Example
//!
//! ```rust
//! use gistmirror_store::{MemoryStore, NewNode, NoteStore};
//!
//! let store = MemoryStore::new();
//! let root = store.root_id();
//! let id = store.create_node(NewNode::new(root, "snippets")).unwrap();
//! store.set_tag(id, "mirrorRoot", "").unwrap();
//!
//! assert_eq!(store.find_by_tag("mirrorRoot").unwrap().unwrap().id, id);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod node;
mod store;
mod transaction;
mod tree;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use node::{NewNode, Node, NodeId};
pub use store::NoteStore;
pub use transaction::{Mutation, Transaction};
