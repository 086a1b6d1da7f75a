//! The mount table: one root drive plus named mounted drives.

use std::collections::BTreeMap;

use crate::drive::Drive;
use crate::path::Path;

/// The reserved namespace segment mounted drives live under.
///
/// `/mnt/<name>/...` addresses the drive mounted as `<name>`; everything
/// after the two-segment prefix is relative to that drive.
pub const MOUNT_NAMESPACE: &str = "mnt";

/// One root drive plus a name -> drive mapping, built once at startup and
/// immutable thereafter. Resolution is a pure function of the path and
/// these contents.
pub struct MountTable {
    root: Drive,
    mounts: BTreeMap<String, Drive>,
}

impl MountTable {
    /// A table with no mounted drives.
    pub fn new(root: Drive) -> Self {
        Self {
            root,
            mounts: BTreeMap::new(),
        }
    }

    /// A table with the given mounted drives. There is no dynamic
    /// mount/unmount after construction.
    pub fn with_mounts(root: Drive, mounts: BTreeMap<String, Drive>) -> Self {
        Self { root, mounts }
    }

    pub fn root(&self) -> &Drive {
        &self.root
    }

    pub fn mounts(&self) -> &BTreeMap<String, Drive> {
        &self.mounts
    }

    pub fn has_mounts(&self) -> bool {
        !self.mounts.is_empty()
    }

    /// Resolve an absolute path to the drive that answers it and the path
    /// relative to that drive.
    ///
    /// Case-sensitive, exact-match lookup: `/mnt/<name>/...` goes to the
    /// drive mounted as `<name>` when it exists. A mount segment naming no
    /// drive is not an error - it falls through to the root drive as a
    /// literal path. Callers who want guaranteed mount semantics must
    /// pre-check drive existence.
    pub fn resolve(&self, path: &Path) -> (&Drive, Path) {
        if path.len() >= 2 && path[0] == MOUNT_NAMESPACE {
            if let Some(drive) = self.mounts.get(&path[1]) {
                return (drive, path.slice_from(2));
            }
        }
        (&self.root, path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use std::sync::Arc;
    use unifs_memory_store::MemoryStore;

    fn table() -> MountTable {
        let root = Drive::new(Arc::new(MemoryStore::new()));
        let backup = Drive::new(Arc::new(MemoryStore::new()));
        MountTable::with_mounts(
            root,
            BTreeMap::from([("backup".to_string(), backup)]),
        )
    }

    #[test]
    fn mounted_prefix_resolves_to_drive() {
        let table = table();
        let (drive, relative) = table.resolve(&path!("/mnt/backup/docs/a.txt"));
        assert!(drive.same_store(&table.mounts()["backup"]));
        assert_eq!(relative, path!("/docs/a.txt"));
    }

    #[test]
    fn bare_mount_prefix_resolves_to_drive_root() {
        let table = table();
        let (drive, relative) = table.resolve(&path!("/mnt/backup"));
        assert!(drive.same_store(&table.mounts()["backup"]));
        assert!(relative.is_root());
    }

    #[test]
    fn unknown_mount_name_falls_through_to_root() {
        let table = table();
        let original = path!("/mnt/doesnotexist/a.txt");
        let (drive, relative) = table.resolve(&original);
        assert!(drive.same_store(table.root()));
        assert_eq!(relative, original);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = table();
        let (drive, relative) = table.resolve(&path!("/mnt/Backup/a.txt"));
        assert!(drive.same_store(table.root()));
        assert_eq!(relative, path!("/mnt/Backup/a.txt"));
    }

    #[test]
    fn ordinary_paths_go_to_root() {
        let table = table();
        let (drive, relative) = table.resolve(&path!("/users/alice"));
        assert!(drive.same_store(table.root()));
        assert_eq!(relative, path!("/users/alice"));

        let (drive, relative) = table.resolve(&Path::root());
        assert!(drive.same_store(table.root()));
        assert!(relative.is_root());
    }

    #[test]
    fn mnt_alone_is_a_literal_root_path() {
        let table = table();
        let (drive, relative) = table.resolve(&path!("/mnt"));
        assert!(drive.same_store(table.root()));
        assert_eq!(relative, path!("/mnt"));
    }
}
