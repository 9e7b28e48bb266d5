//! Save-data archive engine.
//!
//! # Architecture
//!
//! - `entry.rs` - Shared archive data model
//! - `codec.rs` - Zip encoding/decoding
//! - `filename.rs` - Entry-name recovery for legacy encodings
//! - `detect.rs` - Import-format dispatch
//! - `builder.rs` - Export-side tree capture
//! - `extract.rs` - Import-side extraction

pub use builder::ArchiveBuilder;
pub use codec::{LoadOptions, NameDecoding, ZipCodec};
pub use detect::ImportFormat;
pub use entry::{Archive, ArchiveEntry, Compression};
pub use error::{Error, Result};
pub use extract::{SaveExtractor, write_single_save};
pub use filename::decode_entry_name;

mod builder;
mod codec;
mod detect;
mod entry;
mod error;
mod extract;
mod filename;
