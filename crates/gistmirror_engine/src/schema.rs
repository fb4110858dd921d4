//! Tag, relation and icon names managed by the engine.

/// Tag marking the mirror root.
pub const MIRROR_ROOT_TAG: &str = "mirrorRoot";
/// Root tag naming the remote account.
pub const USERNAME: &str = "username";
/// Root tag telling the store how to order mirrored items.
pub const SORT_KEY: &str = "sortKey";
/// Icon tag.
pub const ICON_CLASS: &str = "iconClass";
/// Relation from the root to its template node.
pub const TEMPLATE: &str = "template";
/// Title of the template node.
pub const TEMPLATE_TITLE: &str = "template";

/// Remote item identifier.
pub const REMOTE_ID: &str = "remoteId";
/// Browser URL of the remote item.
pub const REMOTE_URL: &str = "remoteUrl";
/// When the engine last wrote the node.
pub const LAST_SYNCED: &str = "lastSynced";
/// Remote modification time of the version the node reflects.
pub const REMOTE_UPDATED_AT: &str = "remoteUpdatedAt";
/// Marks nodes the store should not let users edit.
pub const READ_ONLY: &str = "readOnly";
/// Relation from a file node to its item node.
pub const CHILD_OF: &str = "childOf";

/// Promoted attribute declaration for `remoteId`.
pub const REMOTE_ID_DECLARATION: (&str, &str) = ("label:remoteId", "promoted,single,text");
/// Promoted attribute declaration for `remoteUrl`.
pub const REMOTE_URL_DECLARATION: (&str, &str) = ("label:remoteUrl", "promoted,single,url");

/// Icon of the mirror root.
pub const ROOT_ICON: &str = "bx bxl-github";
/// Icon of mirrored item nodes.
pub const ITEM_ICON: &str = "bx bxl-github";
/// Icon of the template node.
pub const TEMPLATE_ICON: &str = "bx bx-copy-alt";
/// Icon of files with an unknown language.
pub const FILE_ICON: &str = "bx bx-file";
