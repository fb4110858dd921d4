//! # gistmirror remote
//!
//! Types and client for the remote snippet collection mirrored by gistmirror.
//!
//! This crate provides:
//! - [`RemoteItem`] / [`RemoteFile`], decoded from the service's JSON listing
//! - [`RemoteApi`], the two calls the engine needs ("list items for user",
//!   "fetch raw file")
//! - [`HttpRemote`], a reqwest-backed implementation
//! - [`MockRemote`], an in-memory implementation for tests
//!
//! Both calls are plain HTTP GETs with an `Accept` header. Any non-2xx answer
//! is reported as [`RemoteError::Status`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod item;
mod mock;

pub use client::{HttpRemote, RemoteApi, DEFAULT_API_BASE_URL};
pub use error::{RemoteError, RemoteResult};
pub use item::{RemoteFile, RemoteItem};
pub use mock::MockRemote;
