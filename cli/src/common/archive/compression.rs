//! # Debpack Compression Utilities (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! ## Overview
//!
//! Gzip helpers shared by the payload builders and the tar input reader.
//! Payloads are compressed with `flate2`'s default level and a zeroed gzip
//! header timestamp, so identical input always yields identical bytes.
//!
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, BufRead, BufReader, Read, Write};

/// The two magic bytes every gzip member starts with.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Wraps `inner` in a gzip encoder using the default compression level.
pub fn gzip_encoder<W: Write>(inner: W) -> GzEncoder<W> {
    GzEncoder::new(inner, Compression::default())
}

/// Returns true when `head` starts with the gzip magic bytes.
pub fn is_gzip(head: &[u8]) -> bool {
    head.starts_with(&GZIP_MAGIC)
}

/// # Transparent Gzip Input (`decompress_if_gzip`)
///
/// Peeks at the start of `reader` and returns a reader that yields the
/// decompressed stream when the input is gzip, or the input unchanged otherwise.
/// Nothing is consumed by the peek.
pub fn decompress_if_gzip<'a, R: Read + 'a>(reader: R) -> io::Result<Box<dyn Read + 'a>> {
    let mut buffered = BufReader::new(reader);
    let compressed = is_gzip(buffered.fill_buf()?);
    if compressed {
        Ok(Box::new(GzDecoder::new(buffered)))
    } else {
        Ok(Box::new(buffered))
    }
}

/// Decompresses a complete gzip buffer.
#[cfg(test)]
pub fn gunzip(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(compressed).read_to_end(&mut out)?;
    Ok(out)
}
