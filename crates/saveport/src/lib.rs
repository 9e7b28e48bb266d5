//! Save-data porting for the legacy game shell.
//!
//! Exports the virtual save directory as a portable zip archive and
//! restores uploaded archives or single legacy save slots, committing to
//! durable storage before success is reported. The shell's UI, download
//! and telemetry surfaces are reached through the narrow traits in
//! [`effects`]; the save directory itself arrives through a lazily awaited
//! [`SaveDirHandle`].

pub use effects::{Delivery, Event, Notice, Notifier, Telemetry};
pub use error::{Error, Result};
pub use flush::FlushScheduler;
pub use handle::{SaveDirHandle, prepare_save_dir};
pub use manager::{ImportFile, ManagerConfig, SaveDataManager};

pub mod effects;
mod error;
mod flush;
mod handle;
mod manager;
