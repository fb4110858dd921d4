//! Show command implementation.

use gistmirror_engine::schema::{MIRROR_ROOT_TAG, REMOTE_ID, TEMPLATE};
use gistmirror_store::{FileStore, NodeId, NoteStore, StoreResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A node of the printed subtree.
#[derive(Debug, Serialize)]
pub struct TreeView {
    /// Node ID.
    pub id: NodeId,
    /// Title.
    pub title: String,
    /// Note type.
    pub note_type: String,
    /// MIME type.
    pub mime: String,
    /// Content length in bytes.
    pub content_len: usize,
    /// Tags.
    pub tags: BTreeMap<String, Option<String>>,
    /// Child nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeView>,
}

/// Builds the view of `id` and everything below it.
pub fn build_view<S: NoteStore>(store: &S, id: NodeId) -> StoreResult<Option<TreeView>> {
    let Some(node) = store.get(id)? else {
        return Ok(None);
    };
    let children = store
        .children(id)?
        .into_iter()
        .map(|child| build_view(store, child.id))
        .collect::<StoreResult<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    Ok(Some(TreeView {
        id: node.id,
        title: node.title,
        note_type: node.note_type,
        mime: node.mime,
        content_len: node.content.len(),
        tags: node.tags,
        children,
    }))
}

/// Runs the show command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No store found at {:?}", path).into());
    }
    let store = FileStore::open(path)?;
    let root = store
        .find_by_tag(MIRROR_ROOT_TAG)?
        .ok_or("No mirror root; run `gistmirror init` first")?;
    let template = root.relation(TEMPLATE);
    let view = build_view(&store, root.id)?.ok_or("Mirror root vanished")?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&view)?),
        _ => print_text(&view, template, 0),
    }
    Ok(())
}

fn print_text(view: &TreeView, template: Option<NodeId>, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if Some(view.id) == template {
        " (template)".to_string()
    } else if let Some(Some(id)) = view.tags.get(REMOTE_ID) {
        format!(" [{id}]")
    } else if depth > 0 && view.note_type == "code" {
        format!(" <{}, {} bytes>", view.mime, view.content_len)
    } else {
        String::new()
    };
    println!("{indent}{}{marker}", view.title);
    for child in &view.children {
        print_text(child, template, depth + 1);
    }
}
