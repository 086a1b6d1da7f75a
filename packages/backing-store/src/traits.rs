//! The backing-store capability trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{ChildEntry, FileContent, RawPath, StoreError};

/// One storage root, consumed through a narrow async capability.
///
/// All paths are relative to the store's own root; the empty path is the
/// root itself. Implementations are expected to serve a single interactive
/// user: two concurrent writers to the same path race and the last write
/// wins.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn BackingStore>`.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Read a file as text.
    ///
    /// Returns `Ok(None)` if the path does not exist, is a folder, or is
    /// not valid UTF-8.
    async fn read_text(&self, path: &RawPath) -> Result<Option<String>, StoreError>;

    /// Read a file as raw bytes.
    ///
    /// Returns `Ok(None)` if the path does not exist or is a folder.
    async fn read_bytes(&self, path: &RawPath) -> Result<Option<Bytes>, StoreError>;

    /// Create or overwrite a file.
    ///
    /// Missing intermediate folders are created implicitly where the store
    /// can do so; otherwise the call fails with `StoreError::NotFound`.
    async fn write_file(&self, path: &RawPath, content: &FileContent) -> Result<(), StoreError>;

    /// Create an empty folder. Idempotent if it already exists.
    async fn create_folder(&self, path: &RawPath) -> Result<(), StoreError>;

    /// Delete a file or folder. Folder deletion is recursive.
    ///
    /// Deleting a path that does not exist is `Err(StoreError::NotFound)`,
    /// not a silent success.
    async fn delete(&self, path: &RawPath) -> Result<(), StoreError>;

    /// List immediate children of a folder, one level only.
    ///
    /// Returns `Ok(None)` if the path does not exist or is a file.
    async fn list(&self, path: &RawPath) -> Result<Option<Vec<ChildEntry>>, StoreError>;
}

// Blanket implementations for references and smart pointers

#[async_trait]
impl<T: BackingStore + ?Sized> BackingStore for &T {
    async fn read_text(&self, path: &RawPath) -> Result<Option<String>, StoreError> {
        (**self).read_text(path).await
    }

    async fn read_bytes(&self, path: &RawPath) -> Result<Option<Bytes>, StoreError> {
        (**self).read_bytes(path).await
    }

    async fn write_file(&self, path: &RawPath, content: &FileContent) -> Result<(), StoreError> {
        (**self).write_file(path, content).await
    }

    async fn create_folder(&self, path: &RawPath) -> Result<(), StoreError> {
        (**self).create_folder(path).await
    }

    async fn delete(&self, path: &RawPath) -> Result<(), StoreError> {
        (**self).delete(path).await
    }

    async fn list(&self, path: &RawPath) -> Result<Option<Vec<ChildEntry>>, StoreError> {
        (**self).list(path).await
    }
}

#[async_trait]
impl<T: BackingStore + ?Sized> BackingStore for Box<T> {
    async fn read_text(&self, path: &RawPath) -> Result<Option<String>, StoreError> {
        self.as_ref().read_text(path).await
    }

    async fn read_bytes(&self, path: &RawPath) -> Result<Option<Bytes>, StoreError> {
        self.as_ref().read_bytes(path).await
    }

    async fn write_file(&self, path: &RawPath, content: &FileContent) -> Result<(), StoreError> {
        self.as_ref().write_file(path, content).await
    }

    async fn create_folder(&self, path: &RawPath) -> Result<(), StoreError> {
        self.as_ref().create_folder(path).await
    }

    async fn delete(&self, path: &RawPath) -> Result<(), StoreError> {
        self.as_ref().delete(path).await
    }

    async fn list(&self, path: &RawPath) -> Result<Option<Vec<ChildEntry>>, StoreError> {
        self.as_ref().list(path).await
    }
}

#[async_trait]
impl<T: BackingStore + ?Sized> BackingStore for std::sync::Arc<T> {
    async fn read_text(&self, path: &RawPath) -> Result<Option<String>, StoreError> {
        self.as_ref().read_text(path).await
    }

    async fn read_bytes(&self, path: &RawPath) -> Result<Option<Bytes>, StoreError> {
        self.as_ref().read_bytes(path).await
    }

    async fn write_file(&self, path: &RawPath, content: &FileContent) -> Result<(), StoreError> {
        self.as_ref().write_file(path, content).await
    }

    async fn create_folder(&self, path: &RawPath) -> Result<(), StoreError> {
        self.as_ref().create_folder(path).await
    }

    async fn delete(&self, path: &RawPath) -> Result<(), StoreError> {
        self.as_ref().delete(path).await
    }

    async fn list(&self, path: &RawPath) -> Result<Option<Vec<ChildEntry>>, StoreError> {
        self.as_ref().list(path).await
    }
}
