//! Error types for the backing-store layer.
//!
//! Errors at this level are storage-medium failures. Semantic errors
//! (invalid paths, depth mismatches) belong in higher layers.

/// Errors a backing store can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The path does not exist.
    ///
    /// Only surfaced by operations that require the path to exist
    /// (`delete`). Reads report absence as `Ok(None)` instead.
    #[error("path not found")]
    NotFound,

    /// The storage medium itself failed.
    ///
    /// Permission denied, I/O fault, quota exceeded. Always propagated to
    /// the caller unchanged; the semantic layer has no safe recovery.
    #[error("backing store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap an arbitrary error as a backend failure.
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(error))
    }

    /// Whether this is the distinguishable not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::Backend(Box::new(e)),
        }
    }
}
