//! A routing/materialization wrapper around one backing storage root.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt};

use unifs_backing_store::{BackingStore, EntryKind, FileContent, StoreError};

use crate::error::Error;
use crate::node::{
    DeepEntry, DeepFile, DeepFolder, Depth, FsNode, ShallowEntry, ShallowFolder, StubFile,
};
use crate::path::Path;

/// The name a folder node carries for a given path. The root has no
/// segment of its own and is named `/`.
fn folder_name(path: &Path) -> String {
    path.name().unwrap_or("/").to_string()
}

/// One storage root with path-relative CRUD and shallow/deep tree
/// materialization. Stateless beyond owning its backing store.
#[derive(Clone)]
pub struct Drive {
    store: Arc<dyn BackingStore>,
}

impl Drive {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Whether two drives wrap the same backing store.
    pub(crate) fn same_store(&self, other: &Drive) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Create or overwrite a file. Missing parent folders are created by
    /// the backing store where it can; otherwise this fails `NotFound`.
    pub async fn write_file(&self, path: &Path, content: &FileContent) -> Result<(), Error> {
        self.store
            .write_file(&path.to_raw(), content)
            .await
            .map_err(Error::from)
    }

    /// Create an empty folder. Idempotent if it already exists.
    pub async fn create_folder(&self, path: &Path) -> Result<(), Error> {
        self.store
            .create_folder(&path.to_raw())
            .await
            .map_err(Error::from)
    }

    /// Remove a file or folder, recursively for folders.
    ///
    /// Deleting a path that does not exist surfaces the store's `NotFound`
    /// failure; it is not swallowed.
    pub async fn delete(&self, path: &Path) -> Result<(), Error> {
        self.store.delete(&path.to_raw()).await.map_err(Error::from)
    }

    /// Shallow existence probe.
    pub async fn exists(&self, path: &Path) -> Result<bool, Error> {
        Ok(self.get_item(path, Depth::Shallow).await?.is_some())
    }

    /// Read a file at the requested depth. `None` if nothing exists at
    /// the path or it is a folder.
    ///
    /// Deep reads re-detect the encoding from the stored bytes: content
    /// written as `FileContent::Bytes` that happens to be valid UTF-8
    /// comes back as `FileContent::Text`. The bytes themselves round-trip
    /// exactly; the variant tag is not persisted.
    pub async fn get_file(&self, path: &Path, depth: Depth) -> Result<Option<FsNode>, Error> {
        let Some(name) = path.name() else {
            // The root is a folder.
            return Ok(None);
        };

        match depth {
            Depth::Shallow => {
                // Existence without content: ask the parent listing.
                let parent = path.parent().unwrap_or_else(Path::root);
                let Some(children) = self.store.list(&parent.to_raw()).await? else {
                    return Ok(None);
                };
                let found = children
                    .iter()
                    .any(|c| c.kind == EntryKind::File && c.name == name);
                Ok(found.then(|| FsNode::StubFile(StubFile::new(name))))
            }
            Depth::Deep => match self.store.read_bytes(&path.to_raw()).await? {
                Some(bytes) => Ok(Some(FsNode::DeepFile(DeepFile::new(
                    name,
                    FileContent::from_bytes(bytes),
                )))),
                None => Ok(None),
            },
        }
    }

    /// Read a folder at the requested depth. `None` if nothing exists at
    /// the path or it is a file.
    pub async fn get_folder(&self, path: &Path, depth: Depth) -> Result<Option<FsNode>, Error> {
        match depth {
            Depth::Shallow => Ok(self
                .shallow_folder(path)
                .await?
                .map(FsNode::ShallowFolder)),
            Depth::Deep => Ok(self
                .deep_folder(path.clone())
                .await?
                .map(FsNode::DeepFolder)),
        }
    }

    /// Read whatever lives at the path, auto-detecting file vs folder.
    pub async fn get_item(&self, path: &Path, depth: Depth) -> Result<Option<FsNode>, Error> {
        if let Some(folder) = self.get_folder(path, depth).await? {
            return Ok(Some(folder));
        }
        self.get_file(path, depth).await
    }

    /// Write a pre-built deep item into the tree at `path`, recursively
    /// materializing it into the backing store. Inverse of a deep read.
    ///
    /// The item's own name is ignored; it lands at `path`.
    pub async fn insert(&self, path: &Path, item: &DeepEntry) -> Result<(), Error> {
        self.insert_at(path.clone(), item).await
    }

    /// Relocate a file or folder within this drive.
    ///
    /// The backing capability has no rename, so this is a deep read of the
    /// source, a materialization at the destination, and a delete of the
    /// source. Not atomic. A destination inside the source folder is
    /// rejected before anything is written: the trailing delete would take
    /// the fresh copy down with the original. Moving an existing item onto
    /// its own path is a no-op; a missing source is always `NotFound`.
    pub async fn move_item(&self, from: &Path, to: &Path) -> Result<(), Error> {
        if from != to && to.starts_with(from) {
            return Err(Error::MoveIntoSubtree {
                from: from.clone(),
                to: to.clone(),
            });
        }
        let entry = self
            .get_deep(from)
            .await?
            .ok_or(Error::Store(StoreError::NotFound))?;
        if from == to {
            return Ok(());
        }
        self.insert_at(to.clone(), &entry).await?;
        self.delete(from).await
    }

    /// One level of structure, children unresolved.
    async fn shallow_folder(&self, path: &Path) -> Result<Option<ShallowFolder>, Error> {
        let Some(children) = self.store.list(&path.to_raw()).await? else {
            return Ok(None);
        };
        let items = children
            .into_iter()
            .map(|child| {
                let entry = match child.kind {
                    EntryKind::File => ShallowEntry::File(StubFile::new(child.name.clone())),
                    EntryKind::Folder => {
                        ShallowEntry::Folder(ShallowFolder::placeholder(child.name.clone()))
                    }
                };
                (child.name, entry)
            })
            .collect();
        Ok(Some(ShallowFolder::new(folder_name(path), items)))
    }

    /// Recursive-descent deep materialization.
    ///
    /// Lists one level, then fans out every child fetch concurrently and
    /// joins them all before assembling the folder. Any descendant failure
    /// fails the whole read; no partial trees are returned.
    fn deep_folder(&self, path: Path) -> BoxFuture<'_, Result<Option<DeepFolder>, Error>> {
        async move {
            let Some(children) = self.store.list(&path.to_raw()).await? else {
                return Ok(None);
            };

            let fetches = children.into_iter().map(|child| {
                let child_path = path.child(&child.name);
                async move {
                    let child_path = child_path?;
                    match child.kind {
                        EntryKind::Folder => match self.deep_folder(child_path).await? {
                            Some(folder) => Ok(DeepEntry::Folder(folder)),
                            // Listed a moment ago but gone now; failing the
                            // read keeps partial trees out.
                            None => Err(Error::Store(StoreError::NotFound)),
                        },
                        EntryKind::File => {
                            match self.store.read_bytes(&child_path.to_raw()).await? {
                                Some(bytes) => Ok(DeepEntry::File(DeepFile::new(
                                    child.name,
                                    FileContent::from_bytes(bytes),
                                ))),
                                None => Err(Error::Store(StoreError::NotFound)),
                            }
                        }
                    }
                }
            });

            let entries = try_join_all(fetches).await?;
            let items: BTreeMap<String, DeepEntry> = entries
                .into_iter()
                .map(|entry| (entry.name().to_string(), entry))
                .collect();
            Ok(Some(DeepFolder::new(folder_name(&path), items)))
        }
        .boxed()
    }

    /// Deep read as an insertable entry, folder or file.
    pub(crate) async fn get_deep(&self, path: &Path) -> Result<Option<DeepEntry>, Error> {
        if let Some(folder) = self.deep_folder(path.clone()).await? {
            return Ok(Some(DeepEntry::Folder(folder)));
        }
        let Some(name) = path.name() else {
            return Ok(None);
        };
        match self.store.read_bytes(&path.to_raw()).await? {
            Some(bytes) => Ok(Some(DeepEntry::File(DeepFile::new(
                name,
                FileContent::from_bytes(bytes),
            )))),
            None => Ok(None),
        }
    }

    fn insert_at<'a>(&'a self, path: Path, item: &'a DeepEntry) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            match item {
                DeepEntry::File(file) => self
                    .store
                    .write_file(&path.to_raw(), &file.content)
                    .await
                    .map_err(Error::from),
                DeepEntry::Folder(folder) => {
                    self.store.create_folder(&path.to_raw()).await?;
                    let writes = folder.items.iter().map(|(name, entry)| {
                        let child_path = path.child(name);
                        async move { self.insert_at(child_path?, entry).await }
                    });
                    try_join_all(writes).await?;
                    Ok(())
                }
            }
        }
        .boxed()
    }
}
