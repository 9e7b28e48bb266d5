//! Entry-name recovery for archives written by non-UTF-8 tools.
//!
//! Legacy zip utilities store entry names in the platform's double-byte
//! encoding. Candidate decoders are tried strictly and in order; there is
//! no lossy fallback.

use crate::error::{Error, Result};

type Decoder = fn(&[u8]) -> Option<String>;

const DECODERS: &[Decoder] = &[decode_utf8, decode_shift_jis];

/// Decode a raw entry name, trying UTF-8 first and Shift_JIS second.
pub fn decode_entry_name(bytes: &[u8]) -> Result<String> {
    DECODERS
        .iter()
        .find_map(|decode| decode(bytes))
        .ok_or(Error::BadEntryName)
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}

fn decode_shift_jis(bytes: &[u8]) -> Option<String> {
    encoding_rs::SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|name| name.into_owned())
}
