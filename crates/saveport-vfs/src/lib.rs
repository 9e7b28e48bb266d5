//! Sandboxed virtual filesystem boundary for save-data operations.
//!
//! The save-data engine never touches storage directly; it goes through the
//! [`VirtualFs`] trait, which mirrors the narrow surface a mounted save
//! directory actually exposes: enumerate, stat, whole-file read/write,
//! directory creation, and an explicit durable-storage sync. Two
//! implementations are provided: [`MemoryVfs`] keeps the tree in process,
//! [`HostVfs`] maps it onto a jailed host directory.

mod error;
mod host;
mod memory;

pub use error::{Error, Result};
pub use host::HostVfs;
pub use memory::MemoryVfs;

use std::path::Path;

/// What a path resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata for one entry, as returned by [`VirtualFs::stat`].
#[derive(Clone, Copy, Debug)]
pub struct FileStat {
    pub kind: EntryKind,
    pub size: u64,
}

impl FileStat {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// The mounted save directory's filesystem surface.
///
/// Paths are slash-separated and absolute within the sandbox; implementations
/// must not let any operation reach outside their root. Files are replaced
/// whole, never mutated in place.
#[async_trait::async_trait]
pub trait VirtualFs: Send + Sync {
    /// Names of the immediate children of a directory.
    async fn readdir(&self, path: &Path) -> Result<Vec<String>>;

    async fn stat(&self, path: &Path) -> Result<FileStat>;

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write a file, overwriting any existing one. The parent directory
    /// must already exist.
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Create a directory under an existing parent. Succeeds if the
    /// directory is already present.
    async fn mkdir(&self, path: &Path) -> Result<()>;

    /// Synchronize with durable storage. `populate` pulls the durable state
    /// into the tree; otherwise the tree is flushed out. Completion of a
    /// flush means every prior write survives a process restart.
    async fn sync(&self, populate: bool) -> Result<()>;
}

/// Resolve to an absolute sandbox path with no `.`/`..` components.
pub(crate) fn normalize(path: &Path) -> std::path::PathBuf {
    use std::path::{Component, PathBuf};
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}
