//! The two-tier folder-tree model.
//!
//! Depth is requested, not inherent to stored data: the same backing
//! content can be read shallow or deep. A deep read is a strict refinement
//! of the corresponding shallow read - same name, same set of immediate
//! children, folders expanded and file contents fetched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use unifs_backing_store::FileContent;

/// How far a read materializes the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// One level of structure, no contents, no recursion.
    Shallow,
    /// Fully recursive resolution including all file contents.
    Deep,
}

/// A file's existence and name only. Produced by shallow reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubFile {
    pub name: String,
}

impl StubFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A file's name and full content. Produced by deep reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepFile {
    pub name: String,
    pub content: FileContent,
}

impl DeepFile {
    pub fn new(name: impl Into<String>, content: impl Into<FileContent>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// One child in a shallow listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShallowEntry {
    File(StubFile),
    Folder(ShallowFolder),
}

impl ShallowEntry {
    pub fn name(&self) -> &str {
        match self {
            ShallowEntry::File(f) => &f.name,
            ShallowEntry::Folder(f) => &f.name,
        }
    }
}

/// A folder's name plus one level of children.
///
/// Child folders are name-only placeholders with empty `items`; their own
/// children are not resolved. The one exception is the synthetic mount
/// folder injected into the root listing, which carries name-only
/// placeholders for each mounted drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShallowFolder {
    pub name: String,
    pub items: BTreeMap<String, ShallowEntry>,
}

impl ShallowFolder {
    pub fn new(name: impl Into<String>, items: BTreeMap<String, ShallowEntry>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// A name-only placeholder with no resolved children.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }
}

/// One child in a deep listing, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeepEntry {
    File(DeepFile),
    Folder(DeepFolder),
}

impl DeepEntry {
    pub fn name(&self) -> &str {
        match self {
            DeepEntry::File(f) => &f.name,
            DeepEntry::Folder(f) => &f.name,
        }
    }

    /// The same entry under a different name.
    ///
    /// Used when relocating an item and when injecting mounted drives into
    /// the root listing under their mount names.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        match self {
            DeepEntry::File(mut f) => {
                f.name = name.into();
                DeepEntry::File(f)
            }
            DeepEntry::Folder(mut f) => {
                f.name = name.into();
                DeepEntry::Folder(f)
            }
        }
    }
}

/// A folder's name plus fully recursively resolved children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepFolder {
    pub name: String,
    pub items: BTreeMap<String, DeepEntry>,
}

impl DeepFolder {
    pub fn new(name: impl Into<String>, items: BTreeMap<String, DeepEntry>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// An empty folder.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }
}

/// What a read returns: the requested depth decides the variant.
///
/// Shallow reads produce `StubFile`/`ShallowFolder`; deep reads produce
/// `DeepFile`/`DeepFolder`. Matching is exhaustive - there is no runtime
/// depth assertion anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum FsNode {
    StubFile(StubFile),
    ShallowFolder(ShallowFolder),
    DeepFile(DeepFile),
    DeepFolder(DeepFolder),
}

impl FsNode {
    pub fn name(&self) -> &str {
        match self {
            FsNode::StubFile(f) => &f.name,
            FsNode::ShallowFolder(f) => &f.name,
            FsNode::DeepFile(f) => &f.name,
            FsNode::DeepFolder(f) => &f.name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, FsNode::ShallowFolder(_) | FsNode::DeepFolder(_))
    }

    pub fn as_shallow_folder(&self) -> Option<&ShallowFolder> {
        match self {
            FsNode::ShallowFolder(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_deep_folder(&self) -> Option<&DeepFolder> {
        match self {
            FsNode::DeepFolder(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_deep_file(&self) -> Option<&DeepFile> {
        match self {
            FsNode::DeepFile(f) => Some(f),
            _ => None,
        }
    }

    /// Convert a deep node into an insertable entry.
    ///
    /// `None` for shallow nodes, which carry too little to materialize.
    pub fn into_deep_entry(self) -> Option<DeepEntry> {
        match self {
            FsNode::DeepFile(f) => Some(DeepEntry::File(f)),
            FsNode::DeepFolder(f) => Some(DeepEntry::Folder(f)),
            FsNode::StubFile(_) | FsNode::ShallowFolder(_) => None,
        }
    }
}

impl From<DeepEntry> for FsNode {
    fn from(entry: DeepEntry) -> Self {
        match entry {
            DeepEntry::File(f) => FsNode::DeepFile(f),
            DeepEntry::Folder(f) => FsNode::DeepFolder(f),
        }
    }
}
