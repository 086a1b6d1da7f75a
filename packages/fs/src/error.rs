//! Error types for the virtual-filesystem core.
//!
//! Absence is not represented here: every read operation returns
//! `Ok(None)` for a path that does not exist. These errors are path
//! validation failures and backing-store faults.

use crate::path::{Path, PathError};
use unifs_backing_store::StoreError;

/// Errors at the virtual-filesystem layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Path validation error.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Error from the backing store, propagated unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A move whose source and destination resolve to different drives.
    ///
    /// Cross-drive relocation is explicitly unsupported; callers must copy
    /// and delete themselves if they want it.
    #[error("cannot move across drives: {from} -> {to}")]
    CrossDriveMove { from: Path, to: Path },

    /// A move whose destination lies inside the source folder.
    ///
    /// Materializing the copy under the source and then deleting the
    /// source would destroy both, so the case is rejected up front.
    #[error("cannot move a folder into its own subtree: {from} -> {to}")]
    MoveIntoSubtree { from: Path, to: Path },
}

impl Error {
    /// Whether this is the distinguishable not-found outcome, as surfaced
    /// by `delete` and `move_item` on missing paths.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(StoreError::NotFound))
    }
}
