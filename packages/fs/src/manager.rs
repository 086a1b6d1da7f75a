//! The orchestrating facade over the mount table and its drives.

use std::collections::BTreeMap;
use std::sync::Arc;

use unifs_backing_store::{BackingStore, FileContent};

use crate::drive::Drive;
use crate::error::Error;
use crate::mount::{MountTable, MOUNT_NAMESPACE};
use crate::node::{
    DeepEntry, DeepFolder, Depth, FsNode, ShallowEntry, ShallowFolder,
};
use crate::path::Path;
use crate::snapshot::{SnapshotCache, SnapshotHandle, SnapshotKey};
use crate::path;

/// Well-known folder for system data.
pub const SYSTEM_FOLDER: &str = "/system";
/// Well-known folder for installed programs.
pub const PROGRAMS_FOLDER: &str = "/programs";
/// Well-known folder for user data.
pub const USERS_FOLDER: &str = "/users";
/// Well-known registry file, created with an empty JSON object.
pub const REGISTRY_FILE: &str = "/system/registry.json";

pub(crate) struct FsInner {
    pub(crate) table: MountTable,
    pub(crate) cache: SnapshotCache,
}

/// The unified virtual filesystem.
///
/// Composes the mount table and drives into one path-based API. Every
/// operation resolves its path first, then delegates to the drive that
/// answers it with the rewritten relative path. Cheap to clone; clones
/// share the mount table and the snapshot cache.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use unifs_fs::{path, Depth, FsManager};
/// use unifs_memory_store::MemoryStore;
///
/// let fs = FsManager::new(Arc::new(MemoryStore::new()), Default::default());
/// fs.write_file(&path!("/a.txt"), &"hi".into()).await?;
/// let node = fs.get_file(&path!("/a.txt"), Depth::Deep).await?;
/// ```
#[derive(Clone)]
pub struct FsManager {
    inner: Arc<FsInner>,
}

impl FsManager {
    /// Build the namespace from one root storage handle plus zero or more
    /// named mount handles. The mount table is fixed for the life of the
    /// manager.
    pub fn new(
        root: Arc<dyn BackingStore>,
        mounts: BTreeMap<String, Arc<dyn BackingStore>>,
    ) -> Self {
        let root = Drive::new(root);
        let mounts = mounts
            .into_iter()
            .map(|(name, store)| (name, Drive::new(store)))
            .collect();
        Self {
            inner: Arc::new(FsInner {
                table: MountTable::with_mounts(root, mounts),
                cache: SnapshotCache::new(),
            }),
        }
    }

    /// Create or overwrite a file.
    pub async fn write_file(&self, path: &Path, content: &FileContent) -> Result<(), Error> {
        let (drive, relative) = self.inner.table.resolve(path);
        drive.write_file(&relative, content).await
    }

    /// Create an empty folder. Idempotent if it already exists.
    pub async fn create_folder(&self, path: &Path) -> Result<(), Error> {
        let (drive, relative) = self.inner.table.resolve(path);
        drive.create_folder(&relative).await
    }

    /// Remove a file or folder recursively. Deleting a missing path is a
    /// `NotFound` failure, not a silent success.
    pub async fn delete(&self, path: &Path) -> Result<(), Error> {
        let (drive, relative) = self.inner.table.resolve(path);
        drive.delete(&relative).await
    }

    /// Read a file at the requested depth. `None` when nothing exists.
    pub async fn get_file(&self, path: &Path, depth: Depth) -> Result<Option<FsNode>, Error> {
        self.inner.get_file(path, depth).await
    }

    /// Read a folder at the requested depth. `None` when nothing exists.
    ///
    /// Reading the namespace root injects the synthetic mount folder when
    /// any drives are mounted.
    pub async fn get_folder(&self, path: &Path, depth: Depth) -> Result<Option<FsNode>, Error> {
        self.inner.get_folder(path, depth).await
    }

    /// Read whatever lives at the path, auto-detecting file vs folder.
    pub async fn get_item(&self, path: &Path, depth: Depth) -> Result<Option<FsNode>, Error> {
        self.inner.get_item(path, depth).await
    }

    /// Materialize a pre-built deep item at the path.
    pub async fn insert(&self, path: &Path, item: &DeepEntry) -> Result<(), Error> {
        let (drive, relative) = self.inner.table.resolve(path);
        drive.insert(&relative, item).await
    }

    /// Relocate a file or folder. Source and destination must resolve to
    /// the same drive; cross-drive moves are unsupported.
    pub async fn move_item(&self, from: &Path, to: &Path) -> Result<(), Error> {
        let (from_drive, from_relative) = self.inner.table.resolve(from);
        let (to_drive, to_relative) = self.inner.table.resolve(to);
        if !from_drive.same_store(to_drive) {
            return Err(Error::CrossDriveMove {
                from: from.clone(),
                to: to.clone(),
            });
        }
        from_drive.move_item(&from_relative, &to_relative).await
    }

    /// Shallow existence probe through the mount table.
    pub async fn exists(&self, path: &Path) -> Result<bool, Error> {
        let (drive, relative) = self.inner.table.resolve(path);
        drive.exists(&relative).await
    }

    /// Ensure the well-known folders and the registry file exist.
    ///
    /// Idempotent and safe to call repeatedly; existing entries are left
    /// untouched.
    pub async fn setup_default_directories(&self) -> Result<(), Error> {
        for folder in [SYSTEM_FOLDER, PROGRAMS_FOLDER, USERS_FOLDER] {
            let folder = path!(folder);
            if !self.exists(&folder).await? {
                self.create_folder(&folder).await?;
            }
        }

        let registry = path!(REGISTRY_FILE);
        if self.get_file(&registry, Depth::Shallow).await?.is_none() {
            let placeholder = serde_json::json!({}).to_string();
            self.write_file(&registry, &FileContent::Text(placeholder))
                .await?;
        }
        Ok(())
    }

    /// Whether the system folder exists yet. Callers use this to decide
    /// whether a first-run bootstrap is needed.
    pub async fn has_system_data(&self) -> Result<bool, Error> {
        self.exists(&path!(SYSTEM_FOLDER)).await
    }

    /// Subscribe to a live view of a path.
    ///
    /// The returned handle exposes the latest resolved value, refreshed
    /// periodically until the handle is released. Concurrent subscribers
    /// to the same key share one cache entry and one refresh timer.
    pub fn subscribe(&self, key: SnapshotKey) -> SnapshotHandle {
        SnapshotCache::subscribe(&self.inner, key)
    }

    /// Number of live snapshot cache entries.
    pub fn snapshot_entry_count(&self) -> usize {
        self.inner.cache.entry_count()
    }
}

impl FsInner {
    pub(crate) async fn get_file(
        &self,
        path: &Path,
        depth: Depth,
    ) -> Result<Option<FsNode>, Error> {
        let (drive, relative) = self.table.resolve(path);
        drive.get_file(&relative, depth).await
    }

    pub(crate) async fn get_folder(
        &self,
        path: &Path,
        depth: Depth,
    ) -> Result<Option<FsNode>, Error> {
        let (drive, relative) = self.table.resolve(path);
        let node = drive.get_folder(&relative, depth).await?;

        if path.is_root() && self.table.has_mounts() {
            return Ok(Some(self.inject_mounts(node, depth).await?));
        }
        Ok(node)
    }

    pub(crate) async fn get_item(
        &self,
        path: &Path,
        depth: Depth,
    ) -> Result<Option<FsNode>, Error> {
        if path.is_root() {
            // Root is always a folder; route through the injecting read.
            return self.get_folder(path, depth).await;
        }
        let (drive, relative) = self.table.resolve(path);
        drive.get_item(&relative, depth).await
    }

    /// Add the synthetic mount folder to a root listing.
    ///
    /// The entry is computed from the mount table, never stored; it
    /// overwrites any colliding real entry of the same name.
    async fn inject_mounts(&self, root: Option<FsNode>, depth: Depth) -> Result<FsNode, Error> {
        match depth {
            Depth::Shallow => {
                let mut folder = match root {
                    Some(FsNode::ShallowFolder(f)) => f,
                    _ => ShallowFolder::placeholder("/"),
                };
                let mut mount_folder = ShallowFolder::placeholder(MOUNT_NAMESPACE);
                for name in self.table.mounts().keys() {
                    mount_folder.items.insert(
                        name.clone(),
                        ShallowEntry::Folder(ShallowFolder::placeholder(name.clone())),
                    );
                }
                folder.items.insert(
                    MOUNT_NAMESPACE.to_string(),
                    ShallowEntry::Folder(mount_folder),
                );
                Ok(FsNode::ShallowFolder(folder))
            }
            Depth::Deep => {
                let mut folder = match root {
                    Some(FsNode::DeepFolder(f)) => f,
                    _ => DeepFolder::empty("/"),
                };
                let mut mount_folder = DeepFolder::empty(MOUNT_NAMESPACE);
                for (name, drive) in self.table.mounts() {
                    let entry = match drive.get_deep(&Path::root()).await? {
                        Some(entry) => entry.with_name(name.clone()),
                        None => DeepEntry::Folder(DeepFolder::empty(name.clone())),
                    };
                    mount_folder.items.insert(name.clone(), entry);
                }
                folder.items.insert(
                    MOUNT_NAMESPACE.to_string(),
                    DeepEntry::Folder(mount_folder),
                );
                Ok(FsNode::DeepFolder(folder))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DeepFile;
    use unifs_memory_store::MemoryStore;

    fn manager_with_mounts(names: &[&str]) -> FsManager {
        let mounts = names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    Arc::new(MemoryStore::new()) as Arc<dyn BackingStore>,
                )
            })
            .collect();
        FsManager::new(Arc::new(MemoryStore::new()), mounts)
    }

    fn manager() -> FsManager {
        manager_with_mounts(&[])
    }

    #[tokio::test]
    async fn write_read_round_trip() {
        let fs = manager();
        fs.write_file(&path!("/docs/a.txt"), &FileContent::from("hello"))
            .await
            .unwrap();

        let node = fs
            .get_file(&path!("/docs/a.txt"), Depth::Deep)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            node.as_deep_file().unwrap().content,
            FileContent::from("hello")
        );
    }

    #[tokio::test]
    async fn no_mounts_means_no_synthetic_entry() {
        let fs = manager();
        let node = fs
            .get_folder(&Path::root(), Depth::Shallow)
            .await
            .unwrap()
            .unwrap();
        let folder = node.as_shallow_folder().unwrap();
        assert!(!folder.items.contains_key(MOUNT_NAMESPACE));
    }

    #[tokio::test]
    async fn shallow_injection_lists_mount_placeholders() {
        let fs = manager_with_mounts(&["backup", "media"]);
        let node = fs
            .get_folder(&Path::root(), Depth::Shallow)
            .await
            .unwrap()
            .unwrap();
        let folder = node.as_shallow_folder().unwrap();

        let mount_entry = &folder.items[MOUNT_NAMESPACE];
        match mount_entry {
            ShallowEntry::Folder(mnt) => {
                let names: Vec<_> = mnt.items.keys().cloned().collect();
                assert_eq!(names, vec!["backup".to_string(), "media".to_string()]);
                // Placeholders only - no recursion into mounted drives.
                for entry in mnt.items.values() {
                    match entry {
                        ShallowEntry::Folder(f) => assert!(f.items.is_empty()),
                        other => panic!("expected folder placeholder, got {:?}", other),
                    }
                }
            }
            other => panic!("expected synthetic mount folder, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn deep_injection_expands_mounted_drives() {
        let fs = manager_with_mounts(&["backup"]);
        fs.write_file(&path!("/mnt/backup/a.txt"), &FileContent::from("hi"))
            .await
            .unwrap();

        let node = fs
            .get_folder(&Path::root(), Depth::Deep)
            .await
            .unwrap()
            .unwrap();
        let folder = node.as_deep_folder().unwrap();

        match &folder.items[MOUNT_NAMESPACE] {
            DeepEntry::Folder(mnt) => match &mnt.items["backup"] {
                DeepEntry::Folder(backup) => {
                    assert_eq!(backup.name, "backup");
                    assert_eq!(
                        backup.items["a.txt"],
                        DeepEntry::File(DeepFile::new("a.txt", "hi"))
                    );
                }
                other => panic!("expected expanded drive, got {:?}", other),
            },
            other => panic!("expected synthetic mount folder, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn synthetic_entry_overwrites_real_mnt_folder() {
        let fs = manager_with_mounts(&["backup"]);
        // A real folder named mnt in the root store.
        fs.write_file(&path!("/mnt/not-a-drive.txt"), &FileContent::from("x"))
            .await
            .unwrap();

        let node = fs
            .get_folder(&Path::root(), Depth::Shallow)
            .await
            .unwrap()
            .unwrap();
        let folder = node.as_shallow_folder().unwrap();
        match &folder.items[MOUNT_NAMESPACE] {
            ShallowEntry::Folder(mnt) => {
                assert!(mnt.items.contains_key("backup"));
                assert!(!mnt.items.contains_key("not-a-drive.txt"));
            }
            other => panic!("expected synthetic mount folder, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn mount_routing_is_transparent() {
        let backup: Arc<dyn BackingStore> = Arc::new(MemoryStore::new());
        let fs = FsManager::new(
            Arc::new(MemoryStore::new()),
            BTreeMap::from([("backup".to_string(), backup.clone())]),
        );

        fs.write_file(&path!("/mnt/backup/a.txt"), &FileContent::from("hi"))
            .await
            .unwrap();

        // The mounted drive sees the file at its own root.
        let direct = Drive::new(backup);
        let node = direct
            .get_file(&path!("/a.txt"), Depth::Deep)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(node.as_deep_file().unwrap().content, FileContent::from("hi"));

        // And it never landed in the root store.
        assert!(!fs.exists(&path!("/a.txt")).await.unwrap());
    }

    #[tokio::test]
    async fn unmatched_mount_segment_reads_literal_root_path() {
        let fs = manager_with_mounts(&["backup"]);
        fs.write_file(
            &path!("/mnt/doesnotexist/a.txt"),
            &FileContent::from("literal"),
        )
        .await
        .unwrap();

        // Routed to the root drive as a literal path, not an error.
        let node = fs
            .get_file(&path!("/mnt/doesnotexist/a.txt"), Depth::Deep)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            node.as_deep_file().unwrap().content,
            FileContent::from("literal")
        );
    }

    #[tokio::test]
    async fn cross_drive_move_is_rejected() {
        let fs = manager_with_mounts(&["backup"]);
        fs.write_file(&path!("/a.txt"), &FileContent::from("x"))
            .await
            .unwrap();

        let err = fs
            .move_item(&path!("/a.txt"), &path!("/mnt/backup/a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CrossDriveMove { .. }));
    }

    #[tokio::test]
    async fn move_within_one_drive_works_through_mounts() {
        let fs = manager_with_mounts(&["backup"]);
        fs.write_file(&path!("/mnt/backup/old.txt"), &FileContent::from("x"))
            .await
            .unwrap();

        fs.move_item(&path!("/mnt/backup/old.txt"), &path!("/mnt/backup/new.txt"))
            .await
            .unwrap();

        assert!(fs.exists(&path!("/mnt/backup/new.txt")).await.unwrap());
        assert!(!fs.exists(&path!("/mnt/backup/old.txt")).await.unwrap());
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let fs = manager();
        assert!(!fs.has_system_data().await.unwrap());

        fs.setup_default_directories().await.unwrap();
        assert!(fs.has_system_data().await.unwrap());

        // Write something, then bootstrap again; nothing is clobbered.
        fs.write_file(&path!("/system/registry.json"), &FileContent::from("{\"k\":1}"))
            .await
            .unwrap();
        fs.setup_default_directories().await.unwrap();

        let node = fs
            .get_file(&path!(REGISTRY_FILE), Depth::Deep)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            node.as_deep_file().unwrap().content,
            FileContent::from("{\"k\":1}")
        );

        for folder in [SYSTEM_FOLDER, PROGRAMS_FOLDER, USERS_FOLDER] {
            assert!(fs.exists(&path!(folder)).await.unwrap());
        }
    }

    #[tokio::test]
    async fn registry_starts_as_empty_object() {
        let fs = manager();
        fs.setup_default_directories().await.unwrap();

        let node = fs
            .get_file(&path!(REGISTRY_FILE), Depth::Deep)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(node.as_deep_file().unwrap().content, FileContent::from("{}"));
    }

    #[tokio::test]
    async fn delete_missing_surfaces_not_found() {
        let fs = manager();
        let err = fs.delete(&path!("/ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
