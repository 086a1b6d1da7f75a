//! UniFS core: one path-based namespace over many backing stores.
//!
//! The namespace has a root drive plus named drives mounted under
//! `/mnt/<name>`. Reads materialize a folder tree at one of two depths:
//! - `Shallow`: one level of structure, no file contents
//! - `Deep`: full recursion with all file contents
//!
//! [`FsManager`] is the entry point; it routes every operation through the
//! mount table and owns the snapshot cache for live path subscriptions.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use unifs_fs::{path, Depth, FsManager};
//! use unifs_memory_store::MemoryStore;
//!
//! let fs = FsManager::new(Arc::new(MemoryStore::new()), Default::default());
//! fs.setup_default_directories().await?;
//! let root = fs.get_folder(&path!("/"), Depth::Shallow).await?;
//! ```

mod drive;
mod error;
mod manager;
mod mount;
mod node;
mod path;
mod snapshot;

pub use drive::Drive;
pub use error::Error;
pub use manager::{
    FsManager, PROGRAMS_FOLDER, REGISTRY_FILE, SYSTEM_FOLDER, USERS_FOLDER,
};
pub use mount::{MountTable, MOUNT_NAMESPACE};
pub use node::{
    DeepEntry, DeepFile, DeepFolder, Depth, FsNode, ShallowEntry, ShallowFolder, StubFile,
};
pub use path::{Path, PathError};
pub use snapshot::{
    SnapshotHandle, SnapshotKey, SnapshotKind, SnapshotState, REFRESH_INTERVAL,
};

// Re-export the storage capability for implementors and callers
pub use unifs_backing_store::{
    BackingStore, ChildEntry, EntryKind, FileContent, RawPath, StoreError,
};
