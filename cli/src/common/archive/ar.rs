//! # Debpack AR Container Writer (`common::archive::ar`)
//!
//! File: cli/src/common/archive/ar.rs
//!
//! ## Overview
//!
//! A `.deb` file is a Unix `ar` archive. This module writes that outer container:
//! the global `!<arch>\n` marker followed by members, each preceded by a fixed
//! 60-byte ASCII header:
//!
//! ```text
//! offset  len  field
//!      0   16  name, left-justified, space padded
//!     16   12  modification time, decimal
//!     28    6  owner id, decimal
//!     34    6  group id, decimal
//!     40    8  mode, octal
//!     48   10  size, decimal
//!     58    2  terminator "`\n"
//! ```
//!
//! Member data is padded with a single `\n` to an even offset. Timestamps and
//! ids are always written as `0`.
//!
use crate::core::error::{BuildResult, DebpackError, Operation, Stage};
use std::io::Write;
use tracing::debug;

/// File identification bytes stored at the beginning of the archive.
pub const GLOBAL_HEADER: &[u8; 8] = b"!<arch>\n";
/// The terminator of each member header.
pub const HEADER_TERMINATOR: &[u8; 2] = b"`\n";
/// Length of a member header.
pub const HEADER_LEN: usize = 60;

const NAME_LEN: usize = 16;
const MAX_SIZE: u64 = 9_999_999_999;
const MAX_MODE: u32 = 0o77_777_777;

/// One member of the outer container.
#[derive(Debug, Clone, Copy)]
pub struct ContainerMember<'a> {
    pub name: &'a str,
    pub mode: u32,
    pub content: &'a [u8],
}

/// Writes an `ar` archive to any byte sink.
pub struct ContainerWriter<W: Write> {
    inner: W,
    members: usize,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, members: 0 }
    }

    /// Writes the `!<arch>\n` marker. Must be called once, before any member.
    pub fn write_global_header(&mut self) -> BuildResult<()> {
        self.inner
            .write_all(GLOBAL_HEADER)
            .map_err(|e| DebpackError::write(Stage::Container, Operation::Header, "!<arch>", e))
    }

    /// Writes one member header, its content and the padding byte if needed.
    pub fn append_member(&mut self, member: &ContainerMember<'_>) -> BuildResult<()> {
        let header = encode_header(member)?;
        self.inner.write_all(&header).map_err(|e| {
            DebpackError::write(Stage::Container, Operation::Header, member.name, e)
        })?;
        self.inner.write_all(member.content).map_err(|e| {
            DebpackError::write(Stage::Container, Operation::Content, member.name, e)
        })?;
        if member.content.len() % 2 == 1 {
            self.inner.write_all(b"\n").map_err(|e| {
                DebpackError::write(Stage::Container, Operation::Content, member.name, e)
            })?;
        }
        self.members += 1;
        debug!(
            "Wrote container member '{}' ({} bytes)",
            member.name,
            member.content.len()
        );
        Ok(())
    }

    /// Number of members written so far.
    pub fn member_count(&self) -> usize {
        self.members
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(mut self) -> BuildResult<W> {
        self.inner
            .flush()
            .map_err(|e| DebpackError::write(Stage::Container, Operation::Close, "sink", e))?;
        Ok(self.inner)
    }
}

/// Builds the 60-byte header of `member`, validating that every field fits.
pub fn encode_header(member: &ContainerMember<'_>) -> BuildResult<[u8; HEADER_LEN]> {
    validate_name(member.name)?;
    let size = member.content.len() as u64;
    if size > MAX_SIZE {
        return Err(invalid(member.name, format!("size {} does not fit the header", size)));
    }
    if member.mode > MAX_MODE {
        return Err(invalid(member.name, format!("mode {:o} does not fit the header", member.mode)));
    }

    let text = format!(
        "{:<16}{:<12}{:<6}{:<6}{:<8o}{:<10}",
        member.name, 0, 0, 0, member.mode, size
    );
    let mut header = [0u8; HEADER_LEN];
    header[..HEADER_LEN - 2].copy_from_slice(text.as_bytes());
    header[HEADER_LEN - 2..].copy_from_slice(HEADER_TERMINATOR);
    Ok(header)
}

fn validate_name(name: &str) -> BuildResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty".to_string()));
    }
    if name.len() > NAME_LEN {
        return Err(invalid(name, format!("name is longer than {} bytes", NAME_LEN)));
    }
    // Space pads the field and '/' terminates GNU-style names.
    if !name.bytes().all(|b| b.is_ascii_graphic() && b != b'/') {
        return Err(invalid(
            name,
            "name must be printable ASCII without spaces or '/'".to_string(),
        ));
    }
    Ok(())
}

fn invalid(name: &str, reason: String) -> DebpackError {
    DebpackError::InvalidMember {
        name: name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_header_layout() {
        let header = encode_header(&ContainerMember {
            name: "debian-binary",
            mode: 0o100644,
            content: b"2.0\n",
        })
        .unwrap();
        assert_eq!(
            &header[..],
            &b"debian-binary   0           0     0     100644  4         `\n"[..]
        );
    }

    #[test]
    fn test_odd_content_is_padded() {
        let mut writer = ContainerWriter::new(Vec::new());
        writer.write_global_header().unwrap();
        writer
            .append_member(&ContainerMember {
                name: "odd",
                mode: 0o644,
                content: b"abc",
            })
            .unwrap();
        writer
            .append_member(&ContainerMember {
                name: "even",
                mode: 0o644,
                content: b"ab",
            })
            .unwrap();
        assert_eq!(writer.member_count(), 2);
        let bytes = writer.into_inner().unwrap();

        assert!(bytes.starts_with(GLOBAL_HEADER));
        assert_eq!(bytes.len(), 8 + (60 + 3 + 1) + (60 + 2));
        assert_eq!(&bytes[8 + 60..8 + 64], b"abc\n");
        assert_eq!(&bytes[8 + 64..8 + 64 + 4], b"even");
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "a-name-longer-than-16", "with space", "gnu/"] {
            let err = encode_header(&ContainerMember {
                name,
                mode: 0o644,
                content: b"",
            })
            .unwrap_err();
            assert!(
                matches!(err, DebpackError::InvalidMember { .. }),
                "name {:?} should be rejected",
                name
            );
        }
        // Exactly 16 bytes is allowed.
        assert!(encode_header(&ContainerMember {
            name: "sixteen-bytes-ok",
            mode: 0o644,
            content: b"",
        })
        .is_ok());
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_is_attributed() {
        let mut writer = ContainerWriter::new(FailingSink);
        let err = writer
            .append_member(&ContainerMember {
                name: "data.tar.gz",
                mode: 0o100644,
                content: b"x",
            })
            .unwrap_err();
        match err {
            DebpackError::Write {
                stage,
                operation,
                entry,
                ..
            } => {
                assert_eq!(stage, Stage::Container);
                assert_eq!(operation, Operation::Header);
                assert_eq!(entry, "data.tar.gz");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
