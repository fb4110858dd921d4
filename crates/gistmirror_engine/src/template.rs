//! Template provisioning for the mirror root.

use crate::error::MirrorResult;
use crate::schema::{
    ICON_CLASS, READ_ONLY, REMOTE_ID, REMOTE_ID_DECLARATION, REMOTE_UPDATED_AT,
    REMOTE_URL_DECLARATION, ROOT_ICON, SORT_KEY, TEMPLATE, TEMPLATE_ICON, TEMPLATE_TITLE,
};
use gistmirror_store::{NewNode, Node, NodeId, NoteStore, StoreError};
use tracing::{info, warn};

/// Ensures the mirror root has a template node and its default tags.
///
/// Resolution order for the template:
/// 1. the root's `template` relation, if its target still exists
/// 2. the root's first child, for trees created before the relation existed
///    (children already mirroring a remote item are never adopted)
/// 3. a new `template` node declaring the promoted attributes
///
/// The root's `iconClass`, `sortKey` and `template` relation are written
/// only where absent. Everything goes through one transaction, so running
/// this twice yields the same tree.
pub fn ensure_template<S: NoteStore>(store: &S, root_id: NodeId) -> MirrorResult<NodeId> {
    let root = store
        .get(root_id)?
        .ok_or(StoreError::NodeNotFound(root_id))?;

    let existing = resolve_existing(store, &root)?;

    let template = store.transaction(|txn| {
        let template = match existing {
            Some(id) => id,
            None => {
                let id = txn.create_node(NewNode::new(root_id, TEMPLATE_TITLE));
                let (key, value) = REMOTE_ID_DECLARATION;
                txn.set_tag(id, key, value);
                let (key, value) = REMOTE_URL_DECLARATION;
                txn.set_tag(id, key, value);
                txn.set_tag(id, ICON_CLASS, TEMPLATE_ICON);
                txn.set_flag(id, READ_ONLY);
                id
            }
        };

        if !root.has_tag(ICON_CLASS) {
            txn.set_tag(root_id, ICON_CLASS, ROOT_ICON);
        }
        if !root.has_tag(SORT_KEY) {
            txn.set_tag(root_id, SORT_KEY, REMOTE_UPDATED_AT);
        }
        if root.relation(TEMPLATE) != Some(template) {
            txn.set_relation(root_id, TEMPLATE, template);
        }
        Ok(template)
    })?;

    if existing.is_none() {
        info!(root = %root_id, template = %template, "created mirror template");
    }
    Ok(template)
}

fn resolve_existing<S: NoteStore>(store: &S, root: &Node) -> MirrorResult<Option<NodeId>> {
    if let Some(target) = root.relation(TEMPLATE) {
        if store.get(target)?.is_some() {
            return Ok(Some(target));
        }
        warn!(root = %root.id, template = %target, "template relation points at a missing node");
    }

    let first = store.children(root.id)?.into_iter().next();
    match first {
        Some(child) if !child.has_tag(REMOTE_ID) => {
            warn!(
                root = %root.id,
                template = %child.id,
                title = %child.title,
                "adopting first child as template"
            );
            Ok(Some(child.id))
        }
        _ => Ok(None),
    }
}
