use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive is corrupted")]
    Corrupted,

    #[error("entry name is not valid in any supported encoding")]
    BadEntryName,

    #[error("entry '{entry}' escapes the destination root")]
    EntryEscapes { entry: PathBuf },

    #[error(transparent)]
    Fs(#[from] saveport_vfs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(err) => Self::Io(err),
            _ => Self::Corrupted,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
