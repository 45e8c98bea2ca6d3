//! Record Store
//!
//! Named blob storage over the sharded tree, fronted by the bounded cache.
//!
//! ## Write Ordering
//! `put` persists to disk (temp file + fsync + rename) before touching the
//! cache. A failed write drops the cache entry, so the cache never holds
//! bytes the filesystem does not.
//!
//! ## Consistency
//! - Single process: reads after a successful `put` see the new bytes,
//!   whether served from cache or disk.
//! - Across processes: no locking. Concurrent writers to the same name race
//!   and the last rename wins, undetected.
//! - `enumerate` is snapshot-at-visit: an entry changed or removed while the
//!   walk is in progress may or may not be observed, and in the old or new
//!   state. Vanished entries are skipped, never reported as errors.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{ManageError, Result};

use super::{BoundedCache, KeyDeriver, PathSharder};

/// Snapshot of cache occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: usize,
    pub capacity: usize,
}

/// Filesystem-backed blob store keyed by name
///
/// ## Concurrency:
/// - Writes (put/delete): Serialized by `write_lock`, held across the disk
///   write and the cache update so the two are applied in the same order
/// - Reads (get/enumerate): No write_lock needed
/// - `cache`: Protected by Mutex, also held across the disk read of a cache
///   miss so a slow reader cannot put older bytes over a newer write
/// - All methods use `&self`; the store is `Send + Sync`
pub struct RecordStore {
    /// Root of the sharded tree
    root: PathBuf,

    /// Identifier → directory path mapping
    sharder: PathSharder,

    /// Non-authoritative copies of recently used blobs
    cache: Mutex<BoundedCache>,

    /// Serializes write operations (put/delete)
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Open or create a store at `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        Ok(Self {
            root: config.data_dir.clone(),
            sharder: PathSharder::new(config.shard_width)?,
            cache: Mutex::new(BoundedCache::new(config.cache_size_limit)),
            write_lock: Mutex::new(()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified root directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(&config)
    }

    /// Store `value` under `name`, replacing any previous value
    pub fn put(&self, name: &str, value: &[u8]) -> Result<()> {
        let id = KeyDeriver::derive(name);
        let path = self.sharder.path(&self.root, &id);
        let _write_guard = self.write_lock.lock();

        if let Err(e) = self.write_file(&path, &id, value) {
            self.cache.lock().remove(&id);
            return Err(e);
        }

        self.cache.lock().insert(id, Bytes::copy_from_slice(value));
        Ok(())
    }

    /// Fetch the value stored under `name`
    pub fn get(&self, name: &str) -> Result<Bytes> {
        let id = KeyDeriver::derive(name);
        self.read_id(&id)?
            .ok_or_else(|| ManageError::NotFound(name.to_string()))
    }

    /// Remove the value stored under `name`
    ///
    /// Existence is decided by the filesystem alone; a cached copy without a
    /// backing file still yields `NotFound` (and is dropped).
    pub fn delete(&self, name: &str) -> Result<()> {
        let id = KeyDeriver::derive(name);
        let path = self.sharder.path(&self.root, &id);
        let _write_guard = self.write_lock.lock();

        let removed = fs::remove_file(&path);
        self.cache.lock().remove(&id);

        match removed {
            Ok(()) => {
                self.prune_empty_dirs(&path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ManageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lazily walk every stored blob as `(identifier, bytes)`
    ///
    /// Order follows directory traversal and must not be relied upon.
    pub fn enumerate(&self) -> Entries<'_> {
        Entries {
            store: self,
            walk: WalkDir::new(&self.root).min_depth(1).into_iter(),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Root directory of the tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path a name maps to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.sharder.path(&self.root, &KeyDeriver::derive(name))
    }

    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock();
        CacheStats {
            entries: cache.len(),
            bytes: cache.size(),
            capacity: cache.max_size(),
        }
    }

    /// Whether `name` currently has a cached copy
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.lock().contains(&KeyDeriver::derive(name))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Cache first, then disk. `Ok(None)` when no file exists.
    fn read_id(&self, id: &str) -> Result<Option<Bytes>> {
        let mut cache = self.cache.lock();
        if let Some(value) = cache.get(id) {
            return Ok(Some(value));
        }

        let path = self.sharder.path(&self.root, id);
        match fs::read(&path) {
            Ok(data) => {
                let value = Bytes::from(data);
                cache.insert(id.to_string(), value.clone());
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a sibling temp file renamed into place
    fn write_file(&self, path: &Path, id: &str, value: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| ManageError::Config(format!("invalid store path {}", path.display())))?;
        fs::create_dir_all(dir)?;

        let tmp_path = dir.join(format!(".{}.{}.tmp", id, std::process::id()));
        let written = (|| -> io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(value)?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove directories emptied by a delete, stopping at the root
    fn prune_empty_dirs(&self, file_path: &Path) {
        let mut dir = file_path.parent();
        while let Some(d) = dir {
            if d == self.root || !d.starts_with(&self.root) {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the climb
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}

/// Lazy iterator over every stored blob
///
/// Skips temp files and anything else not named like an identifier.
pub struct Entries<'a> {
    store: &'a RecordStore,
    walk: walkdir::IntoIter,
}

impl Iterator for Entries<'_> {
    type Item = Result<(String, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    // A directory pruned mid-walk is not an error
                    if e.io_error().map(|err| err.kind()) == Some(io::ErrorKind::NotFound) {
                        continue;
                    }
                    return Some(Err(ManageError::Io(e.into())));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(id) = entry.file_name().to_str() else {
                continue;
            };
            if !KeyDeriver::is_identifier(id) {
                continue;
            }

            match self.store.read_id(id) {
                Ok(Some(value)) => return Some(Ok((id.to_string(), value))),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
