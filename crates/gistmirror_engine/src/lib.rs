//! # gistmirror engine
//!
//! Reconciles a remote snippet collection into a hierarchical note store.
//!
//! This crate provides:
//! - Type mapping from a file's declared language to a note type and icon
//! - Template provisioning under the mirror root
//! - Per-item reconciliation (create, refresh or leave alone)
//! - A bounded pool for raw file fetches
//! - The [`MirrorEngine`] driving whole passes
//!
//! ## Pass
//!
//! 1. Find the node tagged `mirrorRoot` (no root: skip the pass)
//! 2. Resolve the username (none: fail before any network call)
//! 3. Ensure the template node exists
//! 4. List the remote items (failure: abort, nothing touched)
//! 5. Reconcile every item as an isolated task
//! 6. Stamp `lastSynced` on the root
//!
//! ## Key Invariants
//!
//! - Exactly one template node is referenced by the root
//! - Every mirrored item node carries `remoteId` and `lastSynced`
//! - A node is refreshed only when its item is strictly newer than the
//!   recorded `remoteUpdatedAt`; re-running a pass is a no-op
//! - Every write for one item is committed as one store transaction
//! - Nodes are never deleted
//!
//! ## Example
//!
//! ```rust,no_run
//! use gistmirror_engine::{MirrorConfig, MirrorEngine};
//! use gistmirror_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MirrorConfig::new().with_username("octocat");
//! let remote = Arc::new(config.http_remote()?);
//! let engine = MirrorEngine::new(config, Arc::new(MemoryStore::new()), remote);
//!
//! let report = engine.run().await?;
//! println!("{} created, {} updated", report.created(), report.updated());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod pool;
mod reconcile;
pub mod schema;
mod template;
mod type_map;

pub use config::{MirrorConfig, IDENTITY_ENV_VARS};
pub use engine::{
    ItemFailure, MirrorEngine, MirrorStats, Plan, PlannedItem, RunOutcome, RunReport,
};
pub use error::{MirrorError, MirrorResult};
pub use pool::{FetchPool, FetchRequest, Fetched};
pub use reconcile::{
    needs_update, synced_version, FileReport, FileStatus, ItemOutcome, ItemReconciler,
    ItemReport,
};
pub use template::ensure_template;
pub use type_map::{map_type, NoteKind, GENERIC};
