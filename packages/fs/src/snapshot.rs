//! Refcounted, periodically refreshed snapshots of paths.
//!
//! A subscription pins a cache entry keyed by path, depth, and kind. The
//! first subscriber spawns a refresh task; later subscribers for the same
//! key share the entry and its timer. When the last handle is released the
//! entry is removed and the task stopped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::manager::FsInner;
use crate::node::{Depth, FsNode};
use crate::path::Path;

/// How often a live snapshot re-resolves its path.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// What a subscription watches: one path, at one depth, as one kind.
///
/// Every field participates in identity; `/a` watched shallow and `/a`
/// watched deep are distinct entries with independent refresh timers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub path: Path,
    pub depth: Depth,
    pub kind: SnapshotKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    File,
    Folder,
}

impl SnapshotKey {
    pub fn file(path: Path, depth: Depth) -> Self {
        Self {
            path,
            depth,
            kind: SnapshotKind::File,
        }
    }

    pub fn folder(path: Path, depth: Depth) -> Self {
        Self {
            path,
            depth,
            kind: SnapshotKind::Folder,
        }
    }
}

/// The latest resolved value for a subscribed key.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotState {
    /// No fetch has completed yet.
    Pending,
    /// The most recent successful resolution. `None` means the path did
    /// not exist when last checked.
    Ready(Option<FsNode>),
}

struct CacheEntry {
    /// Distinguishes this entry from a later entry under the same key, so
    /// a stale refresh tick never writes into a successor.
    generation: u64,
    subscribers: usize,
    latest: Arc<RwLock<SnapshotState>>,
    task: JoinHandle<()>,
}

/// The cache of live snapshot entries. One per filesystem; entries are
/// created by subscription and die with their last subscriber.
pub(crate) struct SnapshotCache {
    entries: Mutex<HashMap<SnapshotKey, CacheEntry>>,
    next_generation: AtomicU64,
}

impl SnapshotCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Subscribe to a key, creating the entry and its refresh task on
    /// first subscription.
    ///
    /// Takes the owning filesystem by `Arc` so the spawned task can hold
    /// it weakly; the cache must not keep its owner alive.
    pub(crate) fn subscribe(inner: &Arc<FsInner>, key: SnapshotKey) -> SnapshotHandle {
        let cache = &inner.cache;
        let mut entries = lock(&cache.entries);

        if let Some(entry) = entries.get_mut(&key) {
            entry.subscribers += 1;
            return SnapshotHandle {
                key,
                generation: entry.generation,
                latest: entry.latest.clone(),
                inner: Arc::downgrade(inner),
            };
        }

        let generation = cache.next_generation.fetch_add(1, Ordering::Relaxed);
        let latest = Arc::new(RwLock::new(SnapshotState::Pending));
        let task = tokio::spawn(refresh_loop(
            Arc::downgrade(inner),
            key.clone(),
            generation,
            latest.clone(),
        ));
        entries.insert(
            key.clone(),
            CacheEntry {
                generation,
                subscribers: 1,
                latest: latest.clone(),
                task,
            },
        );

        SnapshotHandle {
            key,
            generation,
            latest,
            inner: Arc::downgrade(inner),
        }
    }

    /// Drop one subscription. The last release removes the entry and
    /// stops its refresh task.
    fn release(&self, key: &SnapshotKey, generation: u64) {
        let mut entries = lock(&self.entries);
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            // The handle outlived its entry; a fresh one took the key.
            return;
        }
        entry.subscribers -= 1;
        if entry.subscribers == 0 {
            if let Some(entry) = entries.remove(key) {
                entry.task.abort();
            }
        }
    }

    /// Whether the entry a refresh tick belongs to is still live.
    fn is_live(&self, key: &SnapshotKey, generation: u64) -> bool {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.generation == generation)
            .unwrap_or(false)
    }

    pub(crate) fn entry_count(&self) -> usize {
        lock(&self.entries).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The per-entry refresh task. The first tick fires immediately, so a new
/// subscription resolves without waiting a full interval.
async fn refresh_loop(
    inner: Weak<FsInner>,
    key: SnapshotKey,
    generation: u64,
    latest: Arc<RwLock<SnapshotState>>,
) {
    let mut interval = tokio::time::interval(REFRESH_INTERVAL);
    loop {
        interval.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        match fetch(&inner, &key).await {
            Ok(value) => {
                // The entry may have been released while the fetch was in
                // flight; a stale tick must not write anywhere.
                if !inner.cache.is_live(&key, generation) {
                    break;
                }
                *latest
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) =
                    SnapshotState::Ready(value);
            }
            Err(err) => {
                log::warn!(
                    "snapshot refresh failed for {}, keeping last value: {}",
                    key.path,
                    err
                );
            }
        }
    }
}

async fn fetch(inner: &FsInner, key: &SnapshotKey) -> Result<Option<FsNode>, crate::error::Error> {
    match key.kind {
        SnapshotKind::File => inner.get_file(&key.path, key.depth).await,
        SnapshotKind::Folder => inner.get_folder(&key.path, key.depth).await,
    }
}

/// A live subscription to one snapshot key.
///
/// Dropping the handle releases the subscription.
pub struct SnapshotHandle {
    key: SnapshotKey,
    generation: u64,
    latest: Arc<RwLock<SnapshotState>>,
    inner: Weak<FsInner>,
}

impl SnapshotHandle {
    pub fn key(&self) -> &SnapshotKey {
        &self.key
    }

    /// The latest resolved state. `Pending` until the first fetch lands.
    pub fn latest(&self) -> SnapshotState {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Explicit release; equivalent to dropping the handle.
    pub fn release(self) {}
}

impl Drop for SnapshotHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cache.release(&self.key, self.generation);
        }
    }
}
