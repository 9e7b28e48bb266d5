use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("is a directory: {path}")]
    IsADirectory { path: PathBuf },

    #[error("path escapes the filesystem root: {path}")]
    OutsideRoot { path: PathBuf },

    #[error("durable-storage sync failed: {reason}")]
    Sync { reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Map a host I/O error, keeping the path for the common lookup failures.
pub fn from_io(path: &std::path::Path, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::NotADirectory => Error::NotADirectory {
            path: path.to_path_buf(),
        },
        io::ErrorKind::IsADirectory => Error::IsADirectory {
            path: path.to_path_buf(),
        },
        _ => Error::Io(err),
    }
}
