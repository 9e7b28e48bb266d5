//! In-memory virtual filesystem backed by a path map.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::{EntryKind, FileStat, VirtualFs, normalize};

enum Node {
    Directory,
    File(Vec<u8>),
}

/// A virtual filesystem kept entirely in process.
///
/// Entries are stored in a `BTreeMap` keyed by normalized absolute paths, so
/// enumeration order is deterministic. The root `/` always exists and every
/// entry's parent is a directory that also exists. There is no backing layer:
/// [`VirtualFs::sync`] only records that it ran, observable through
/// [`MemoryVfs::populate_count`] and [`MemoryVfs::flush_count`].
pub struct MemoryVfs {
    entries: Mutex<BTreeMap<PathBuf, Node>>,
    populates: AtomicUsize,
    flushes: AtomicUsize,
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVfs {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("/"), Node::Directory);
        Self {
            entries: Mutex::new(entries),
            populates: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
        }
    }

    /// Insert a file, creating missing parent directories. Intended for
    /// seeding a tree before handing it to the engine.
    pub fn seed_file(&self, path: impl AsRef<Path>, content: &[u8]) {
        let path = normalize(path.as_ref());
        let mut entries = self.entries.lock().unwrap();
        let mut dir = PathBuf::from("/");
        if let Some(parent) = path.parent() {
            for component in parent.components() {
                if let Component::Normal(part) = component {
                    dir.push(part);
                    entries.entry(dir.clone()).or_insert(Node::Directory);
                }
            }
        }
        entries.insert(path, Node::File(content.to_vec()));
    }

    /// How many times the durable state was pulled in (`sync(true)`).
    pub fn populate_count(&self) -> usize {
        self.populates.load(Ordering::SeqCst)
    }

    /// How many times the tree was flushed out (`sync(false)`).
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VirtualFs for MemoryVfs {
    async fn readdir(&self, path: &Path) -> Result<Vec<String>> {
        let dir = normalize(path);
        let entries = self.entries.lock().unwrap();
        match entries.get(&dir) {
            Some(Node::Directory) => {}
            Some(Node::File(_)) => return Err(Error::NotADirectory { path: dir }),
            None => return Err(Error::NotFound { path: dir }),
        }
        Ok(entries
            .keys()
            .filter(|key| key.parent() == Some(dir.as_path()))
            .filter_map(|key| key.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    async fn stat(&self, path: &Path) -> Result<FileStat> {
        let path = normalize(path);
        let entries = self.entries.lock().unwrap();
        match entries.get(&path) {
            Some(Node::Directory) => Ok(FileStat {
                kind: EntryKind::Directory,
                size: 0,
            }),
            Some(Node::File(content)) => Ok(FileStat {
                kind: EntryKind::File,
                size: content.len() as u64,
            }),
            None => Err(Error::NotFound { path }),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let path = normalize(path);
        let entries = self.entries.lock().unwrap();
        match entries.get(&path) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Directory) => Err(Error::IsADirectory { path }),
            None => Err(Error::NotFound { path }),
        }
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        let path = normalize(path);
        let mut entries = self.entries.lock().unwrap();
        check_parent(&entries, &path)?;
        if let Some(Node::Directory) = entries.get(&path) {
            return Err(Error::IsADirectory { path });
        }
        entries.insert(path, Node::File(content.to_vec()));
        Ok(())
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&path) {
            Some(Node::Directory) => return Ok(()),
            Some(Node::File(_)) => return Err(Error::NotADirectory { path }),
            None => {}
        }
        check_parent(&entries, &path)?;
        entries.insert(path, Node::Directory);
        Ok(())
    }

    async fn sync(&self, populate: bool) -> Result<()> {
        if populate {
            self.populates.fetch_add(1, Ordering::SeqCst);
        } else {
            self.flushes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn check_parent(entries: &BTreeMap<PathBuf, Node>, path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    };
    match entries.get(parent) {
        Some(Node::Directory) => Ok(()),
        Some(Node::File(_)) => Err(Error::NotADirectory {
            path: parent.to_path_buf(),
        }),
        None => Err(Error::NotFound {
            path: parent.to_path_buf(),
        }),
    }
}
