//! Export-side traversal: capture a save directory as archive entries.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use saveport_vfs::VirtualFs;

use crate::entry::{Archive, ArchiveEntry, Compression};
use crate::error::Result;

/// Walks a virtual directory tree and captures it into an [`Archive`].
///
/// Entries whose name starts with `.` are never captured. Files whose
/// lowercased name ends with the configured lock suffix are skipped; these
/// are the legacy engine's lock/marker files and must not round-trip.
/// Directory entries are captured even when the directory is empty, in the
/// filesystem's enumeration order.
pub struct ArchiveBuilder {
    folder: Option<String>,
    lock_suffix: String,
    compression: Compression,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            folder: None,
            lock_suffix: ".asd.".to_owned(),
            compression: Compression::default(),
        }
    }

    /// Nest every captured entry under a top-level folder of this name.
    pub fn folder(mut self, name: impl Into<String>) -> Self {
        self.folder = Some(name.into());
        self
    }

    /// Lowercased file-name suffix excluded from capture.
    pub fn lock_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.lock_suffix = suffix.into();
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Capture the tree rooted at `root`. An empty tree yields an archive
    /// with no file entries; that is a valid result.
    pub async fn build(&self, fs: &dyn VirtualFs, root: &Path) -> Result<Archive> {
        let mut archive = Archive::new(self.compression);
        let prefix = match &self.folder {
            Some(name) => {
                archive.entries.push(ArchiveEntry::directory(name));
                PathBuf::from(name)
            }
            None => PathBuf::new(),
        };
        self.walk(fs, root, &prefix, &mut archive).await?;
        Ok(archive)
    }

    fn walk<'a>(
        &'a self,
        fs: &'a dyn VirtualFs,
        dir: &'a Path,
        prefix: &'a Path,
        archive: &'a mut Archive,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            for name in fs.readdir(dir).await? {
                if name.starts_with('.') {
                    continue;
                }
                let path = dir.join(&name);
                if fs.stat(&path).await?.is_dir() {
                    let nested = prefix.join(&name);
                    archive.entries.push(ArchiveEntry::directory(&nested));
                    self.walk(fs, &path, &nested, archive).await?;
                } else if !name.to_lowercase().ends_with(&self.lock_suffix) {
                    let content = fs.read_file(&path).await?;
                    archive
                        .entries
                        .push(ArchiveEntry::file(prefix.join(&name), content));
                }
            }
            Ok(())
        })
    }
}
