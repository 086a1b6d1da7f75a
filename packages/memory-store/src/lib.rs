//! In-memory backing store.
//!
//! Holds a whole storage root as a tree of nodes behind a mutex. Used as
//! the default store and throughout the test suites. The mutex is never
//! held across an await point; every operation locks, works on the tree,
//! and unlocks before returning.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use unifs_backing_store::{
    BackingStore, ChildEntry, EntryKind, FileContent, RawPath, StoreError,
};

/// One node in the in-memory tree.
#[derive(Debug, Clone)]
enum Node {
    File(FileContent),
    Folder(BTreeMap<String, Node>),
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Node::File(_) => EntryKind::File,
            Node::Folder(_) => EntryKind::Folder,
        }
    }
}

/// An in-memory store holding a full tree of files and folders.
///
/// # Example
///
/// ```rust,ignore
/// use unifs_memory_store::MemoryStore;
/// use unifs_backing_store::{BackingStore, FileContent};
///
/// let store = MemoryStore::new();
/// let path = vec!["a.txt".to_string()];
/// store.write_file(&path, &FileContent::from("hi")).await?;
/// assert_eq!(store.read_text(&path).await?.as_deref(), Some("hi"));
/// ```
pub struct MemoryStore {
    root: Mutex<BTreeMap<String, Node>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            root: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Node>> {
        // Tree mutations are infallible, so a poisoned lock can only come
        // from a panicking test; recover the guard either way.
        self.root.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Walk to the node at `path`, if it exists.
    fn lookup<'a>(root: &'a BTreeMap<String, Node>, path: &RawPath) -> Option<&'a Node> {
        let (first, rest) = path.split_first()?;
        let mut node = root.get(first)?;
        for segment in rest {
            match node {
                Node::Folder(children) => node = children.get(segment)?,
                Node::File(_) => return None,
            }
        }
        Some(node)
    }

    /// Walk to the folder holding `path`'s last segment, creating missing
    /// intermediate folders along the way.
    ///
    /// Fails with `NotFound` if an intermediate segment is a file.
    fn parent_for_write<'a>(
        root: &'a mut BTreeMap<String, Node>,
        path: &RawPath,
    ) -> Result<(&'a mut BTreeMap<String, Node>, String), StoreError> {
        let (last, parents) = path.split_last().ok_or(StoreError::NotFound)?;
        let mut current = root;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Node::Folder(BTreeMap::new()));
            match entry {
                Node::Folder(children) => current = children,
                Node::File(_) => return Err(StoreError::NotFound),
            }
        }
        Ok((current, last.clone()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn read_text(&self, path: &RawPath) -> Result<Option<String>, StoreError> {
        let root = self.lock();
        match Self::lookup(&root, path) {
            Some(Node::File(content)) => Ok(content.as_text().map(str::to_string)),
            _ => Ok(None),
        }
    }

    async fn read_bytes(&self, path: &RawPath) -> Result<Option<Bytes>, StoreError> {
        let root = self.lock();
        match Self::lookup(&root, path) {
            Some(Node::File(content)) => Ok(Some(content.as_bytes())),
            _ => Ok(None),
        }
    }

    async fn write_file(&self, path: &RawPath, content: &FileContent) -> Result<(), StoreError> {
        let mut root = self.lock();
        let (parent, name) = Self::parent_for_write(&mut root, path)?;
        parent.insert(name, Node::File(content.clone()));
        Ok(())
    }

    async fn create_folder(&self, path: &RawPath) -> Result<(), StoreError> {
        let mut root = self.lock();
        let (parent, name) = Self::parent_for_write(&mut root, path)?;
        // Idempotent for folders; an existing file is replaced, matching
        // the overwrite-with-directory behavior of the disk store.
        match parent.get(&name) {
            Some(Node::Folder(_)) => Ok(()),
            _ => {
                parent.insert(name, Node::Folder(BTreeMap::new()));
                Ok(())
            }
        }
    }

    async fn delete(&self, path: &RawPath) -> Result<(), StoreError> {
        let mut root = self.lock();
        let (last, parents) = path.split_last().ok_or(StoreError::NotFound)?;
        let mut current = &mut *root;
        for segment in parents {
            match current.get_mut(segment) {
                Some(Node::Folder(children)) => current = children,
                _ => return Err(StoreError::NotFound),
            }
        }
        match current.remove(last) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list(&self, path: &RawPath) -> Result<Option<Vec<ChildEntry>>, StoreError> {
        let root = self.lock();
        let children = if path.is_empty() {
            &*root
        } else {
            match Self::lookup(&root, path) {
                Some(Node::Folder(children)) => children,
                _ => return Ok(None),
            }
        };
        Ok(Some(
            children
                .iter()
                .map(|(name, node)| ChildEntry {
                    name: name.clone(),
                    kind: node.kind(),
                })
                .collect(),
        ))
    }
}
