use saveport_archive as archive;
use saveport_vfs as vfs;

/// Failure taxonomy for save-data operations. Every import failure is
/// converted at the orchestration boundary into one generic user
/// notification plus a diagnostic telemetry record; the variants exist so
/// that record can say which stage gave way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The archive or one of its entry names could not be parsed.
    #[error("archive decode failed: {0}")]
    Decode(#[source] archive::Error),

    /// A virtual-filesystem read, write or mkdir was rejected.
    #[error("filesystem operation failed: {0}")]
    Filesystem(#[source] vfs::Error),

    /// The durable-storage commit reported an error.
    #[error("durable-storage commit failed: {0}")]
    Persistence(#[source] vfs::Error),

    /// The delivery collaborator rejected the finished archive.
    #[error("archive delivery failed: {0}")]
    Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<archive::Error> for Error {
    fn from(err: archive::Error) -> Self {
        match err {
            archive::Error::Fs(err) => Self::Filesystem(err),
            other => Self::Decode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
