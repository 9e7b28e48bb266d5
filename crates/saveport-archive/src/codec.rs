//! Zip codec: the boundary between [`Archive`] values and binary blobs.

use std::io::{Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::entry::{Archive, ArchiveEntry, Compression};
use crate::error::{Error, Result};
use crate::filename::decode_entry_name;

/// How entry names are decoded when an archive is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NameDecoding {
    /// Strict UTF-8 with a strict Shift_JIS fallback.
    #[default]
    Recover,
    /// Whatever the zip library decides. Degraded mode for hosts without
    /// the strict decoders.
    CodecDefault,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    pub name_decoding: NameDecoding,
}

impl LoadOptions {
    pub fn name_decoding(mut self, mode: NameDecoding) -> Self {
        self.name_decoding = mode;
        self
    }
}

pub struct ZipCodec;

impl ZipCodec {
    /// Decode a zip blob into an [`Archive`].
    pub fn load(bytes: &[u8], options: &LoadOptions) -> Result<Archive> {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).map_err(|_| Error::Corrupted)?;
        let mut archive = Archive::default();
        for index in 0..zip.len() {
            let mut file = zip.by_index(index).map_err(|_| Error::Corrupted)?;
            let name = match options.name_decoding {
                NameDecoding::Recover => decode_entry_name(&file.name_raw().to_vec())?,
                NameDecoding::CodecDefault => file.name().to_owned(),
            };
            let is_directory = name.ends_with('/');
            let path = PathBuf::from(name.trim_end_matches('/'));
            let content = if is_directory {
                Vec::new()
            } else {
                let mut buf = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut buf)?;
                buf
            };
            archive.entries.push(ArchiveEntry {
                path,
                content,
                is_directory,
            });
        }
        Ok(archive)
    }

    /// Encode an [`Archive`] into a zip blob using its compression mode.
    pub fn save(archive: &Archive) -> Result<Vec<u8>> {
        let method = match archive.compression {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default().compression_method(method);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &archive.entries {
            let name = zip_name(&entry.path);
            if entry.is_directory {
                writer.add_directory(name, options)?;
            } else {
                writer.start_file(name, options)?;
                writer.write_all(&entry.content)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }
}

/// Forward-slash entry name, whatever the host separator is.
fn zip_name(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
