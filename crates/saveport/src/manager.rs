//! Save-data orchestration: export, import and outcome reporting.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use saveport_archive::{
    ArchiveBuilder, Compression, ImportFormat, LoadOptions, NameDecoding, SaveExtractor, ZipCodec,
    write_single_save,
};

use crate::effects::{Delivery, Event, Notice, Notifier, Telemetry};
use crate::error::{Error, Result};
use crate::handle::SaveDirHandle;

/// Tunables for [`SaveDataManager`]. Defaults match the legacy shell.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Save directory inside the sandbox.
    pub save_root: PathBuf,
    /// Reserved top-level folder inside exported archives.
    pub archive_folder: String,
    /// Extension (without the dot) of legacy save-slot files.
    pub legacy_ext: String,
    /// Suggested file name for exported archives.
    pub archive_name: String,
    pub compression: Compression,
    pub name_decoding: NameDecoding,
    /// User-facing import outcome messages.
    pub restored_message: String,
    pub restore_failed_message: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            save_root: PathBuf::from("/save"),
            archive_folder: "save".to_owned(),
            legacy_ext: "asd".to_owned(),
            archive_name: "savedata.zip".to_owned(),
            compression: Compression::Deflated,
            name_decoding: NameDecoding::Recover,
            restored_message: "セーブデータの復元に成功しました。".to_owned(),
            restore_failed_message: "セーブデータを復元できませんでした。".to_owned(),
        }
    }
}

impl ManagerConfig {
    pub fn save_root(mut self, save_root: impl Into<PathBuf>) -> Self {
        self.save_root = save_root.into();
        self
    }

    pub fn archive_folder(mut self, archive_folder: impl Into<String>) -> Self {
        self.archive_folder = archive_folder.into();
        self
    }

    pub fn legacy_ext(mut self, legacy_ext: impl Into<String>) -> Self {
        self.legacy_ext = legacy_ext.into();
        self
    }

    pub fn archive_name(mut self, archive_name: impl Into<String>) -> Self {
        self.archive_name = archive_name.into();
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn name_decoding(mut self, name_decoding: NameDecoding) -> Self {
        self.name_decoding = name_decoding;
        self
    }

    fn save_suffix(&self) -> String {
        format!(".{}", self.legacy_ext.to_lowercase())
    }

    fn lock_suffix(&self) -> String {
        format!(".{}.", self.legacy_ext.to_lowercase())
    }
}

/// A file the user picked for import.
#[derive(Clone, Debug)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Sequences save-data export and import against the mounted save
/// directory and reports outcomes to the shell collaborators.
///
/// The two flows share nothing but the [`SaveDirHandle`]; neither holds
/// state across calls.
pub struct SaveDataManager {
    fs: SaveDirHandle,
    notifier: Arc<dyn Notifier>,
    delivery: Arc<dyn Delivery>,
    telemetry: Arc<dyn Telemetry>,
    config: ManagerConfig,
}

impl SaveDataManager {
    pub fn new(
        fs: SaveDirHandle,
        notifier: Arc<dyn Notifier>,
        delivery: Arc<dyn Delivery>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        Self {
            fs,
            notifier,
            delivery,
            telemetry,
            config: ManagerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether any legacy save slot exists under the save root. Read-only;
    /// a missing or unreadable save directory means "no save data".
    pub async fn has_save_data(&self) -> bool {
        let Ok(fs) = self.fs.get().await else {
            return false;
        };
        let Ok(names) = fs.readdir(&self.config.save_root).await else {
            return false;
        };
        let suffix = self.config.save_suffix();
        names
            .iter()
            .any(|name| name.to_lowercase().ends_with(&suffix))
    }

    /// Export the save directory and hand the archive to the delivery
    /// collaborator. Any failure is fatal to the operation; nothing
    /// partial is ever delivered.
    pub async fn download(&self) -> Result<()> {
        let fs = self.fs.get().await?;
        let archive = ArchiveBuilder::new()
            .folder(self.config.archive_folder.as_str())
            .lock_suffix(self.config.lock_suffix())
            .compression(self.config.compression)
            .build(fs.as_ref(), &self.config.save_root)
            .await?;
        debug!(files = archive.file_count(), "save data captured");
        let bytes = ZipCodec::save(&archive)?;
        self.delivery
            .deliver(&self.config.archive_name, bytes)
            .map_err(Error::Delivery)?;
        self.telemetry.record(Event::Downloaded);
        Ok(())
    }

    /// Restore save data from a user-supplied file, then commit to durable
    /// storage. The outcome is reported through the notifier and telemetry
    /// collaborators; failures never propagate, and the user-facing message
    /// never carries the underlying diagnostic.
    pub async fn extract(&self, file: &ImportFile) {
        match self.try_extract(file).await {
            Ok(()) => {
                self.notifier
                    .notify(&self.config.restored_message, Notice::Success);
                self.telemetry.record(Event::Restored);
            }
            Err(err) => {
                warn!(error = %err, file = %file.name, "save-data restore failed");
                self.notifier
                    .notify(&self.config.restore_failed_message, Notice::Failure);
                self.telemetry.record(Event::RestoreFailed {
                    detail: err.to_string(),
                });
            }
        }
    }

    async fn try_extract(&self, file: &ImportFile) -> Result<()> {
        let fs = self.fs.get().await?;
        match ImportFormat::detect(&file.name, &self.config.legacy_ext) {
            ImportFormat::LegacySave => {
                write_single_save(fs.as_ref(), &self.config.save_root, &file.name, &file.bytes)
                    .await?;
            }
            ImportFormat::Archive => {
                let options = LoadOptions::default().name_decoding(self.config.name_decoding);
                let archive = ZipCodec::load(&file.bytes, &options)?;
                SaveExtractor::new(self.config.archive_folder.as_str())
                    .extract(fs.as_ref(), &archive, &self.config.save_root)
                    .await?;
            }
        }
        fs.sync(false).await.map_err(Error::Persistence)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use saveport_archive::{Archive, ArchiveEntry};
    use saveport_vfs::{MemoryVfs, VirtualFs};

    use super::*;
    use crate::effects::doubles::{MemDelivery, MemNotifier, MemTelemetry};

    struct Harness {
        fs: Arc<MemoryVfs>,
        notifier: Arc<MemNotifier>,
        delivery: Arc<MemDelivery>,
        telemetry: Arc<MemTelemetry>,
        manager: SaveDataManager,
    }

    fn harness() -> Harness {
        harness_with(Arc::new(MemoryVfs::new()), Arc::new(MemDelivery::default()))
    }

    fn harness_with(fs: Arc<MemoryVfs>, delivery: Arc<MemDelivery>) -> Harness {
        fs.seed_file("/save/.keep", b"");
        let notifier = Arc::new(MemNotifier::default());
        let telemetry = Arc::new(MemTelemetry::default());
        let manager = SaveDataManager::new(
            SaveDirHandle::ready(fs.clone() as Arc<dyn VirtualFs>),
            notifier.clone(),
            delivery.clone(),
            telemetry.clone(),
        );
        Harness {
            fs,
            notifier,
            delivery,
            telemetry,
            manager,
        }
    }

    fn archive_bytes(entries: Vec<ArchiveEntry>) -> Vec<u8> {
        let mut archive = Archive::default();
        archive.entries = entries;
        ZipCodec::save(&archive).unwrap()
    }

    #[tokio::test]
    async fn has_save_data_matches_case_insensitively() {
        let h = harness();
        assert!(!h.manager.has_save_data().await);

        h.fs.seed_file("/save/notes.txt", b"not a slot");
        assert!(!h.manager.has_save_data().await);

        h.fs.seed_file("/save/Game01.AsD", b"slot");
        assert!(h.manager.has_save_data().await);
    }

    #[tokio::test]
    async fn has_save_data_without_a_save_dir_is_false() {
        let fs = Arc::new(MemoryVfs::new());
        let manager = SaveDataManager::new(
            SaveDirHandle::ready(fs as Arc<dyn VirtualFs>),
            Arc::new(MemNotifier::default()),
            Arc::new(MemDelivery::default()),
            Arc::new(MemTelemetry::default()),
        );
        assert!(!manager.has_save_data().await);
    }

    #[tokio::test]
    async fn download_delivers_a_loadable_archive() {
        let h = harness();
        h.fs.seed_file("/save/GAME01.ASD", b"slot one");
        h.fs.seed_file("/save/sub/GAME02.ASD", b"slot two");
        h.fs.seed_file("/save/game01.asd.", b"lock");

        h.manager.download().await.unwrap();

        let delivered = h.delivery.delivered.lock().unwrap();
        let (name, bytes) = &delivered[0];
        assert_eq!(name, "savedata.zip");
        let archive = ZipCodec::load(bytes, &LoadOptions::default()).unwrap();
        assert_eq!(archive.file_count(), 2);
        assert_eq!(archive.find("save/GAME01.ASD").unwrap().content, b"slot one");
        assert!(archive.find("save/game01.asd.").is_none());
        assert_eq!(
            h.telemetry.events.lock().unwrap().as_slice(),
            &[Event::Downloaded]
        );
    }

    #[tokio::test]
    async fn download_of_an_empty_save_dir_succeeds() {
        let h = harness();
        h.manager.download().await.unwrap();
        let delivered = h.delivery.delivered.lock().unwrap();
        let archive = ZipCodec::load(&delivered[0].1, &LoadOptions::default()).unwrap();
        assert_eq!(archive.file_count(), 0);
    }

    #[tokio::test]
    async fn failed_delivery_aborts_and_records_nothing() {
        let h = harness_with(Arc::new(MemoryVfs::new()), Arc::new(MemDelivery::failing()));
        let err = h.manager.download().await.unwrap_err();
        assert!(matches!(err, Error::Delivery(_)));
        assert!(h.telemetry.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_single_file_import_writes_and_commits() {
        let h = harness();
        let file = ImportFile::new("GAME01.ASD", b"slot".to_vec());

        h.manager.extract(&file).await;

        assert_eq!(
            h.fs.read_file(Path::new("/save/GAME01.ASD")).await.unwrap(),
            b"slot"
        );
        assert_eq!(h.fs.flush_count(), 1);
        assert_eq!(
            h.notifier.messages.lock().unwrap().as_slice(),
            &[(
                ManagerConfig::default().restored_message,
                Notice::Success
            )]
        );
        assert_eq!(
            h.telemetry.events.lock().unwrap().as_slice(),
            &[Event::Restored]
        );
    }

    #[tokio::test]
    async fn archive_import_restores_the_tree() {
        let h = harness();
        let bytes = archive_bytes(vec![
            ArchiveEntry::file("save/sub/GAME02.ASD", b"nested".to_vec()),
            ArchiveEntry::directory("save/sub"),
            ArchiveEntry::file("save/GAME01.ASD", b"top".to_vec()),
        ]);

        h.manager.extract(&ImportFile::new("backup.zip", bytes)).await;

        assert_eq!(
            h.fs.read_file(Path::new("/save/GAME01.ASD")).await.unwrap(),
            b"top"
        );
        assert_eq!(
            h.fs.read_file(Path::new("/save/sub/GAME02.ASD")).await.unwrap(),
            b"nested"
        );
        assert_eq!(h.fs.flush_count(), 1);
    }

    #[tokio::test]
    async fn export_then_import_roundtrips() {
        let h = harness();
        h.fs.seed_file("/save/GAME01.ASD", b"one");
        h.fs.seed_file("/save/sub/GAME02.ASD", b"two");
        h.manager.download().await.unwrap();
        let bytes = h.delivery.delivered.lock().unwrap()[0].1.clone();

        let dest = harness();
        dest.manager
            .extract(&ImportFile::new("savedata.zip", bytes))
            .await;

        assert_eq!(
            dest.fs.read_file(Path::new("/save/GAME01.ASD")).await.unwrap(),
            b"one"
        );
        assert_eq!(
            dest.fs.read_file(Path::new("/save/sub/GAME02.ASD")).await.unwrap(),
            b"two"
        );
    }

    #[tokio::test]
    async fn importing_twice_is_idempotent() {
        let h = harness();
        let bytes = archive_bytes(vec![ArchiveEntry::file(
            "save/GAME01.ASD",
            b"slot".to_vec(),
        )]);
        let file = ImportFile::new("backup.zip", bytes);

        h.manager.extract(&file).await;
        h.manager.extract(&file).await;

        assert_eq!(
            h.fs.readdir(Path::new("/save")).await.unwrap(),
            vec![".keep".to_string(), "GAME01.ASD".to_string()]
        );
        assert_eq!(h.fs.flush_count(), 2);
    }

    #[tokio::test]
    async fn corrupt_input_reports_the_generic_failure() {
        let h = harness();
        h.manager
            .extract(&ImportFile::new("backup.zip", vec![0xDE, 0xAD]))
            .await;

        assert_eq!(h.fs.flush_count(), 0);
        let messages = h.notifier.messages.lock().unwrap();
        assert_eq!(
            messages.as_slice(),
            &[(
                ManagerConfig::default().restore_failed_message,
                Notice::Failure
            )]
        );
        let events = h.telemetry.events.lock().unwrap();
        assert!(matches!(events[0], Event::RestoreFailed { .. }));
    }

    struct FailingSync {
        inner: MemoryVfs,
    }

    #[async_trait::async_trait]
    impl VirtualFs for FailingSync {
        async fn readdir(&self, path: &Path) -> saveport_vfs::Result<Vec<String>> {
            self.inner.readdir(path).await
        }
        async fn stat(&self, path: &Path) -> saveport_vfs::Result<saveport_vfs::FileStat> {
            self.inner.stat(path).await
        }
        async fn read_file(&self, path: &Path) -> saveport_vfs::Result<Vec<u8>> {
            self.inner.read_file(path).await
        }
        async fn write_file(&self, path: &Path, content: &[u8]) -> saveport_vfs::Result<()> {
            self.inner.write_file(path, content).await
        }
        async fn mkdir(&self, path: &Path) -> saveport_vfs::Result<()> {
            self.inner.mkdir(path).await
        }
        async fn sync(&self, _populate: bool) -> saveport_vfs::Result<()> {
            Err(saveport_vfs::Error::Sync {
                reason: "backing store unavailable".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn failed_commit_is_contained_but_diagnosed() {
        let fs = MemoryVfs::new();
        fs.seed_file("/save/.keep", b"");
        let notifier = Arc::new(MemNotifier::default());
        let telemetry = Arc::new(MemTelemetry::default());
        let manager = SaveDataManager::new(
            SaveDirHandle::ready(Arc::new(FailingSync { inner: fs })),
            notifier.clone(),
            Arc::new(MemDelivery::default()),
            telemetry.clone(),
        );

        manager
            .extract(&ImportFile::new("GAME01.ASD", b"slot".to_vec()))
            .await;

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(
            messages.as_slice(),
            &[(
                ManagerConfig::default().restore_failed_message,
                Notice::Failure
            )]
        );
        let events = telemetry.events.lock().unwrap();
        let Event::RestoreFailed { detail } = &events[0] else {
            panic!("expected a RestoreFailed event, got {:?}", events[0]);
        };
        assert!(detail.contains("backing store unavailable"));
        assert!(!messages[0].0.contains("backing store unavailable"));
    }
}
