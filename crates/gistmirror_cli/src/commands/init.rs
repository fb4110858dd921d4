//! Init command implementation.

use gistmirror_engine::schema::{MIRROR_ROOT_TAG, USERNAME};
use gistmirror_store::{FileStore, NewNode, NodeId, NoteStore, StoreResult};
use std::path::Path;
use tracing::info;

/// Outcome of provisioning the mirror root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitResult {
    /// The mirror root.
    pub root: NodeId,
    /// Whether the root was created by this call.
    pub created: bool,
}

/// Creates the mirror root under the store's top node unless one exists.
///
/// An existing root keeps its title; its `username` tag is overwritten
/// only when `username` is given.
pub fn init_root<S: NoteStore>(
    store: &S,
    username: Option<&str>,
    title: &str,
) -> StoreResult<InitResult> {
    if let Some(root) = store.find_by_tag(MIRROR_ROOT_TAG)? {
        if let Some(username) = username {
            if root.tag_value(USERNAME) != Some(username) {
                store.set_tag(root.id, USERNAME, username)?;
            }
        }
        return Ok(InitResult {
            root: root.id,
            created: false,
        });
    }

    let top = store.root_id();
    let root = store.transaction(|txn| {
        let id = txn.create_node(NewNode::new(top, title));
        txn.set_flag(id, MIRROR_ROOT_TAG);
        if let Some(username) = username {
            txn.set_tag(id, USERNAME, username);
        }
        Ok(id)
    })?;
    info!(root = %root, title, "created mirror root");

    Ok(InitResult {
        root,
        created: true,
    })
}

/// Runs the init command.
pub fn run(path: &Path, username: Option<&str>, title: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;
    let result = init_root(&store, username, title)?;

    if result.created {
        println!("Created mirror root {} in {}", result.root, path.display());
    } else {
        println!("Mirror root {} already exists in {}", result.root, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gistmirror_testkit::TempFileStore;

    #[test]
    fn init_is_idempotent() {
        let temp = TempFileStore::new();

        let first = init_root(&*temp, Some("octocat"), "Gists").unwrap();
        let second = init_root(&*temp, None, "Other").unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.root, second.root);
        assert_eq!(temp.children(temp.root_id()).unwrap().len(), 1);

        let root = temp.get(first.root).unwrap().unwrap();
        assert_eq!(root.title, "Gists");
        assert_eq!(root.tag_value(USERNAME), Some("octocat"));
    }

    #[test]
    fn init_updates_username() {
        let temp = TempFileStore::new();
        let first = init_root(&*temp, None, "Gists").unwrap();

        init_root(&*temp, Some("hubot"), "Gists").unwrap();

        let reopened = temp.reopen();
        let root = reopened.get(first.root).unwrap().unwrap();
        assert!(root.has_tag(MIRROR_ROOT_TAG));
        assert_eq!(root.tag_value(USERNAME), Some("hubot"));
    }
}
