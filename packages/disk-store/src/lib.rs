//! Local-filesystem backing store.
//!
//! Maps a storage root onto a directory on disk and serves the capability
//! interface with `tokio::fs`. The root directory must exist, be a
//! directory, and be writable when the store is constructed.

use std::io;
use std::path::{Component, Path as OsPath, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use unifs_backing_store::{
    BackingStore, ChildEntry, EntryKind, FileContent, RawPath, StoreError,
};

/// Errors constructing a [`DiskStore`].
#[derive(Debug, thiserror::Error)]
pub enum DiskStoreError {
    #[error("invalid root path {path:?}: {error}")]
    RootPathInvalid {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

/// A backing store rooted at a directory on the local filesystem.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store over an existing, writable directory.
    pub fn new(root: PathBuf) -> Result<DiskStore, DiskStoreError> {
        let attr = std::fs::metadata(&root).map_err(|error| DiskStoreError::RootPathInvalid {
            path: root.clone(),
            error,
        })?;

        if !attr.is_dir() {
            return Err(DiskStoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("root path must be a directory"),
            });
        }

        if attr.permissions().readonly() {
            return Err(DiskStoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("root directory must be writable"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(DiskStore { root }),
            Err(error) => Err(DiskStoreError::RootPathInvalid { path: root, error }),
        }
    }

    /// Map a raw segment path to a path under the store root.
    ///
    /// Only normal components are accepted; anything that would escape the
    /// root (separators, `..`) is rejected.
    fn file_path(&self, path: &RawPath) -> Result<PathBuf, StoreError> {
        let mut full = self.root.clone();
        for segment in path {
            let os_segment = OsPath::new(segment);
            let mut components = os_segment.components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(c)), None) => full.push(c),
                _ => {
                    return Err(StoreError::backend(io::Error::other(format!(
                        "segment {:?} is not a plain file name",
                        segment
                    ))))
                }
            }
        }
        Ok(full)
    }

    /// Metadata for a path, with absence folded to `None`.
    async fn metadata(path: &OsPath) -> Result<Option<std::fs::Metadata>, StoreError> {
        match fs::metadata(path).await {
            Ok(attr) => Ok(Some(attr)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::backend(e)),
        }
    }
}

#[async_trait]
impl BackingStore for DiskStore {
    async fn read_text(&self, path: &RawPath) -> Result<Option<String>, StoreError> {
        match self.read_bytes(path).await? {
            Some(bytes) => Ok(String::from_utf8(bytes.to_vec()).ok()),
            None => Ok(None),
        }
    }

    async fn read_bytes(&self, path: &RawPath) -> Result<Option<Bytes>, StoreError> {
        let full = self.file_path(path)?;
        match Self::metadata(&full).await? {
            Some(attr) if attr.is_file() => {
                let data = fs::read(&full).await.map_err(StoreError::backend)?;
                Ok(Some(Bytes::from(data)))
            }
            _ => Ok(None),
        }
    }

    async fn write_file(&self, path: &RawPath, content: &FileContent) -> Result<(), StoreError> {
        let full = self.file_path(path)?;
        if path.is_empty() {
            return Err(StoreError::NotFound);
        }

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await.map_err(StoreError::from)?;
        }

        log::debug!("writing {}...", full.display());
        fs::write(&full, content.as_bytes())
            .await
            .map_err(StoreError::from)
    }

    async fn create_folder(&self, path: &RawPath) -> Result<(), StoreError> {
        let full = self.file_path(path)?;

        // Overwrite an existing file with a directory, as the recursive
        // writer does for intermediate paths.
        if let Some(attr) = Self::metadata(&full).await? {
            if attr.is_dir() {
                return Ok(());
            }
            fs::remove_file(&full).await.map_err(StoreError::backend)?;
        }

        fs::create_dir_all(&full).await.map_err(StoreError::backend)
    }

    async fn delete(&self, path: &RawPath) -> Result<(), StoreError> {
        if path.is_empty() {
            // The store root itself is not deletable.
            return Err(StoreError::NotFound);
        }
        let full = self.file_path(path)?;

        match Self::metadata(&full).await? {
            None => Err(StoreError::NotFound),
            Some(attr) if attr.is_dir() => {
                log::debug!("removing directory {}...", full.display());
                fs::remove_dir_all(&full).await.map_err(StoreError::backend)
            }
            Some(_) => {
                log::debug!("removing {}...", full.display());
                fs::remove_file(&full).await.map_err(StoreError::backend)
            }
        }
    }

    async fn list(&self, path: &RawPath) -> Result<Option<Vec<ChildEntry>>, StoreError> {
        let full = self.file_path(path)?;
        match Self::metadata(&full).await? {
            Some(attr) if attr.is_dir() => {}
            _ => return Ok(None),
        }

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&full).await.map_err(StoreError::backend)?;
        while let Some(entry) = dir.next_entry().await.map_err(StoreError::backend)? {
            let file_type = entry.file_type().await.map_err(StoreError::backend)?;
            let kind = if file_type.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            };
            entries.push(ChildEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(entries))
    }
}
