//! Content and listing types shared by all backing stores.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// File content, text or binary.
///
/// All content is materialized in memory; there is no streaming at this
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum FileContent {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
}

impl FileContent {
    /// Build content from raw bytes, preferring text when it is valid UTF-8.
    pub fn from_bytes(bytes: Bytes) -> Self {
        match std::str::from_utf8(&bytes) {
            Ok(s) => FileContent::Text(s.to_string()),
            Err(_) => FileContent::Bytes(bytes),
        }
    }

    /// The content as bytes, whichever encoding it holds.
    pub fn as_bytes(&self) -> Bytes {
        match self {
            FileContent::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
            FileContent::Bytes(b) => b.clone(),
        }
    }

    /// The content as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(s) => Some(s),
            FileContent::Bytes(_) => None,
        }
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        match self {
            FileContent::Text(s) => s.len(),
            FileContent::Bytes(b) => b.len(),
        }
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        FileContent::Text(s.to_string())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        FileContent::Text(s)
    }
}

impl From<Bytes> for FileContent {
    fn from(b: Bytes) -> Self {
        FileContent::Bytes(b)
    }
}

/// Kind of a child entry in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One child in a one-level listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl ChildEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Folder,
        }
    }
}
