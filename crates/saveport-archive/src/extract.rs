//! Import-side extraction: write archive entries back into the save tree.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use saveport_vfs::VirtualFs;
use tracing::debug;

use crate::entry::Archive;
use crate::error::{Error, Result};

/// Writes the entries found under a reserved top-level folder into a
/// destination directory, recreating subdirectories as it goes.
///
/// Entries outside the folder are ignored. Parent directories are created
/// on demand before any file write, so archives that list a file before
/// its directory entry extract the same as well-ordered ones. Existing
/// files are overwritten.
pub struct SaveExtractor {
    folder: String,
}

impl SaveExtractor {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub async fn extract(
        &self,
        fs: &dyn VirtualFs,
        archive: &Archive,
        dest_root: &Path,
    ) -> Result<()> {
        let mut written = 0usize;
        for entry in &archive.entries {
            let Some(relative) = self.scoped(&entry.path)? else {
                continue;
            };
            let dest = dest_root.join(&relative);
            if entry.is_directory {
                ensure_dir(fs, &dest, dest_root).await?;
            } else {
                if let Some(parent) = dest.parent() {
                    ensure_dir(fs, parent, dest_root).await?;
                }
                fs.write_file(&dest, &entry.content).await?;
                written += 1;
            }
        }
        debug!(written, "archive entries applied");
        Ok(())
    }

    /// The entry's path below the reserved folder, or `None` when the entry
    /// does not belong to it. Components that would climb out of the
    /// destination are rejected.
    fn scoped(&self, entry_path: &Path) -> Result<Option<PathBuf>> {
        let mut components = entry_path.components();
        match components.next() {
            Some(Component::Normal(first)) if first == OsStr::new(&self.folder) => {}
            _ => return Ok(None),
        }
        let mut relative = PathBuf::new();
        for component in components {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(Error::EntryEscapes {
                        entry: entry_path.to_path_buf(),
                    });
                }
            }
        }
        if relative.as_os_str().is_empty() {
            return Ok(None);
        }
        Ok(Some(relative))
    }
}

/// Restore one legacy save-slot file under the destination root, keeping
/// only the file name of whatever path the picker handed over.
pub async fn write_single_save(
    fs: &dyn VirtualFs,
    dest_root: &Path,
    name: &str,
    content: &[u8],
) -> Result<()> {
    let file_name = Path::new(name)
        .file_name()
        .ok_or_else(|| Error::EntryEscapes { entry: name.into() })?;
    fs.write_file(&dest_root.join(file_name), content).await?;
    Ok(())
}

/// Create every directory between `base` and `target`, top down. Relies on
/// [`VirtualFs::mkdir`] being a no-op for directories that already exist.
async fn ensure_dir(fs: &dyn VirtualFs, target: &Path, base: &Path) -> Result<()> {
    let relative = target.strip_prefix(base).map_err(|_| Error::EntryEscapes {
        entry: target.to_path_buf(),
    })?;
    let mut current = base.to_path_buf();
    for component in relative.components() {
        current.push(component);
        fs.mkdir(&current).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ArchiveEntry;
    use saveport_vfs::MemoryVfs;

    fn dest() -> MemoryVfs {
        let fs = MemoryVfs::new();
        fs.seed_file("/save/.keep", b"");
        fs
    }

    #[tokio::test]
    async fn extracts_files_and_directories() {
        let fs = dest();
        let mut archive = Archive::default();
        archive.entries.push(ArchiveEntry::directory("save"));
        archive
            .entries
            .push(ArchiveEntry::file("save/GAME01.ASD", b"one".to_vec()));
        archive.entries.push(ArchiveEntry::directory("save/sub"));
        archive
            .entries
            .push(ArchiveEntry::file("save/sub/GAME02.ASD", b"two".to_vec()));

        SaveExtractor::new("save")
            .extract(&fs, &archive, Path::new("/save"))
            .await
            .unwrap();

        assert_eq!(fs.read_file(Path::new("/save/GAME01.ASD")).await.unwrap(), b"one");
        assert_eq!(
            fs.read_file(Path::new("/save/sub/GAME02.ASD")).await.unwrap(),
            b"two"
        );
    }

    #[tokio::test]
    async fn file_before_its_directory_entry() {
        let fs = dest();
        let mut archive = Archive::default();
        archive
            .entries
            .push(ArchiveEntry::file("save/deep/nested/GAME.ASD", b"x".to_vec()));
        archive.entries.push(ArchiveEntry::directory("save/deep"));

        SaveExtractor::new("save")
            .extract(&fs, &archive, Path::new("/save"))
            .await
            .unwrap();

        assert_eq!(
            fs.read_file(Path::new("/save/deep/nested/GAME.ASD")).await.unwrap(),
            b"x"
        );
    }

    #[tokio::test]
    async fn entries_outside_the_folder_are_ignored() {
        let fs = dest();
        let mut archive = Archive::default();
        archive
            .entries
            .push(ArchiveEntry::file("other/evil.asd", b"no".to_vec()));
        archive
            .entries
            .push(ArchiveEntry::file("save/GAME.ASD", b"yes".to_vec()));

        SaveExtractor::new("save")
            .extract(&fs, &archive, Path::new("/save"))
            .await
            .unwrap();

        assert_eq!(fs.read_file(Path::new("/save/GAME.ASD")).await.unwrap(), b"yes");
        assert!(fs.read_file(Path::new("/save/evil.asd")).await.is_err());
    }

    #[tokio::test]
    async fn climbing_entries_are_rejected() {
        let fs = dest();
        let mut archive = Archive::default();
        archive
            .entries
            .push(ArchiveEntry::file("save/../../etc/passwd", b"no".to_vec()));

        let err = SaveExtractor::new("save")
            .extract(&fs, &archive, Path::new("/save"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EntryEscapes { .. }));
    }

    #[tokio::test]
    async fn extraction_overwrites_existing_files() {
        let fs = dest();
        fs.seed_file("/save/GAME.ASD", b"old");
        let mut archive = Archive::default();
        archive
            .entries
            .push(ArchiveEntry::file("save/GAME.ASD", b"new".to_vec()));

        let extractor = SaveExtractor::new("save");
        extractor.extract(&fs, &archive, Path::new("/save")).await.unwrap();
        extractor.extract(&fs, &archive, Path::new("/save")).await.unwrap();

        assert_eq!(fs.read_file(Path::new("/save/GAME.ASD")).await.unwrap(), b"new");
        assert_eq!(fs.readdir(Path::new("/save")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn single_save_lands_under_the_root() {
        let fs = dest();
        write_single_save(&fs, Path::new("/save"), "GAME01.ASD", b"slot")
            .await
            .unwrap();
        assert_eq!(fs.read_file(Path::new("/save/GAME01.ASD")).await.unwrap(), b"slot");
    }

    #[tokio::test]
    async fn single_save_drops_any_directory_part() {
        let fs = dest();
        write_single_save(&fs, Path::new("/save"), "C:/Users/x/GAME01.ASD", b"slot")
            .await
            .unwrap();
        assert_eq!(fs.read_file(Path::new("/save/GAME01.ASD")).await.unwrap(), b"slot");
    }
}
