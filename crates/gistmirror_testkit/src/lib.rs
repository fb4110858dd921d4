//! # gistmirror testkit
//!
//! Test utilities for gistmirror.
//!
//! This crate provides:
//! - Fixtures: a store seeded with a mirror root, a mock remote serving
//!   item files, and file-backed stores in temporary directories
//! - Property-based generators for timestamps and remote items
//!
//! ## Usage
//!
//! ```rust
//! use gistmirror_testkit::prelude::*;
//!
//! let mirror = TestMirror::with_username("octocat");
//! let item = mirror.stock_item("g1", at(2024, 1, 1), &[("a.py", Some("Python"), "print(1)")]);
//! assert_eq!(item.files.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
