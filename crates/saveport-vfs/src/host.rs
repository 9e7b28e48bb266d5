//! Virtual filesystem mapped onto a jailed host directory.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result, from_io};
use crate::{EntryKind, FileStat, VirtualFs, normalize};

/// A [`VirtualFs`] whose tree lives under one host directory.
///
/// Every sandbox path is normalized and re-rooted below `root`; nothing
/// outside it can be reached. The host filesystem is its own durable layer,
/// so [`VirtualFs::sync`] has nothing left to do here.
pub struct HostVfs {
    root: PathBuf,
}

impl HostVfs {
    /// Open a host directory as the sandbox root, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|err| from_io(&root, err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let inner = normalize(path);
        let host = match inner.strip_prefix("/") {
            Ok(relative) => self.root.join(relative),
            Err(_) => self.root.clone(),
        };
        if !host.starts_with(&self.root) {
            return Err(Error::OutsideRoot {
                path: path.to_path_buf(),
            });
        }
        Ok(host)
    }
}

#[async_trait::async_trait]
impl VirtualFs for HostVfs {
    async fn readdir(&self, path: &Path) -> Result<Vec<String>> {
        let host = self.resolve(path)?;
        let mut reader = tokio::fs::read_dir(&host)
            .await
            .map_err(|err| from_io(&host, err))?;
        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|err| from_io(&host, err))? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn stat(&self, path: &Path) -> Result<FileStat> {
        let host = self.resolve(path)?;
        let meta = tokio::fs::metadata(&host)
            .await
            .map_err(|err| from_io(&host, err))?;
        Ok(FileStat {
            kind: if meta.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            size: meta.len(),
        })
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let host = self.resolve(path)?;
        tokio::fs::read(&host).await.map_err(|err| from_io(&host, err))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        let host = self.resolve(path)?;
        tokio::fs::write(&host, content)
            .await
            .map_err(|err| from_io(&host, err))
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        let host = self.resolve(path)?;
        match tokio::fs::create_dir(&host).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                let meta = tokio::fs::metadata(&host)
                    .await
                    .map_err(|err| from_io(&host, err))?;
                if meta.is_dir() {
                    Ok(())
                } else {
                    Err(Error::NotADirectory {
                        path: path.to_path_buf(),
                    })
                }
            }
            Err(err) => Err(from_io(&host, err)),
        }
    }

    async fn sync(&self, _populate: bool) -> Result<()> {
        Ok(())
    }
}
