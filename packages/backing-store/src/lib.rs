//! Backing-store capability layer for unifs.
//!
//! This layer knows nothing about the unified namespace, mounts, or tree
//! materialization. It is the narrow interface one storage root exposes:
//! - read a file as text or bytes
//! - write a file (text or bytes)
//! - create a folder
//! - delete recursively
//! - list immediate children
//!
//! Absence is always `Ok(None)` on reads and listings - "path does not
//! exist" is an expected outcome, not an error. `delete` is the one
//! operation that reports a missing path as `StoreError::NotFound`.

pub use bytes::Bytes;

mod content;
mod error;
mod traits;

pub use content::{ChildEntry, EntryKind, FileContent};
pub use error::StoreError;
pub use traits::BackingStore;

/// A relative path as plain segments, no separators.
///
/// The semantic layer validates paths before they get here; backing stores
/// treat segments as opaque names under their own root.
pub type RawPath = Vec<String>;
