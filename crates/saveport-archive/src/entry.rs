use std::path::{Path, PathBuf};

/// Compression mode applied when an archive is serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

/// One named entry inside an archive. Paths are relative and
/// slash-separated; directory entries carry no content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub is_directory: bool,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<PathBuf>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: Vec::new(),
            is_directory: true,
        }
    }
}

/// An ordered collection of entries plus the compression mode used when it
/// is serialized. Consumers must not depend on entry order.
#[derive(Clone, Debug, Default)]
pub struct Archive {
    pub entries: Vec<ArchiveEntry>,
    pub compression: Compression,
}

impl Archive {
    pub fn new(compression: Compression) -> Self {
        Self {
            entries: Vec::new(),
            compression,
        }
    }

    /// Number of file entries (directories excluded).
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_directory).count()
    }

    pub fn find(&self, path: impl AsRef<Path>) -> Option<&ArchiveEntry> {
        let path = path.as_ref();
        self.entries.iter().find(|e| e.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_and_directory_constructors() {
        let file = ArchiveEntry::file("save/a.asd", b"slot".to_vec());
        assert!(!file.is_directory);
        assert_eq!(file.content, b"slot");

        let dir = ArchiveEntry::directory("save/sub");
        assert!(dir.is_directory);
        assert!(dir.content.is_empty());
    }

    #[test]
    fn file_count_skips_directories() {
        let mut archive = Archive::new(Compression::Deflated);
        archive.entries.push(ArchiveEntry::directory("save"));
        archive.entries.push(ArchiveEntry::file("save/a", Vec::new()));
        archive.entries.push(ArchiveEntry::file("save/b", Vec::new()));
        assert_eq!(archive.file_count(), 2);
        assert_eq!(archive.entries.len(), 3);
    }

    #[test]
    fn find_by_path() {
        let mut archive = Archive::default();
        archive.entries.push(ArchiveEntry::file("save/a", b"1".to_vec()));
        assert!(archive.find("save/a").is_some());
        assert!(archive.find("save/b").is_none());
    }

    #[test]
    fn default_compression_is_deflated() {
        assert_eq!(Archive::default().compression, Compression::Deflated);
    }
}
