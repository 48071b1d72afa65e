//! # Debpack TAR Payload Builder (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! This module builds the two gzip-compressed tar payloads of a Debian package,
//! `data.tar.gz` and `control.tar.gz`, entirely in memory. Besides the compressed
//! bytes, a builder reports what the package assembler needs afterwards:
//! - the cumulative uncompressed body size (for `Installed-Size`);
//! - an ordered digest manifest of every regular file (for `md5sums`).
//!
//! ## Architecture
//!
//! The module leverages the `tar` crate for the archive structure and the
//! `flate2` crate (through `compression::gzip_encoder`) for Gzip compression:
//!
//! ```text
//! tar::Builder  ->  GzEncoder  ->  Vec<u8>
//! ```
//!
//! Entries are classified from their mode bits (`EntryKind::from_mode`):
//! - **Directory**: no body, size 0, mode kept as given.
//! - **Symlink**: content is the link target; size 0, no body.
//! - **Regular**: content is the body; `S_IFREG` is forced into the mode and a
//!   digest record `"<md5>  <path>\n"` is appended.
//!
//! `ArchiveBuilder::finalize` consumes the builder, so no entry can be written
//! after the stream is closed.
//!
//! ## Usage
//!
//! ```rust
//! use debpack::common::archive::tar::ArchiveBuilder;
//! use debpack::core::error::Stage;
//!
//! let mut data = ArchiveBuilder::new(Stage::DataPayload);
//! data.write_entry("usr/share/doc/hello", b"", 0o40755, "root", "root", 0).unwrap();
//! data.write_entry("usr/share/doc/hello/README", b"hi\n", 0o644, "root", "root", 0).unwrap();
//! assert_eq!(data.accumulated_payload_bytes(), 3);
//! let tar_gz: Vec<u8> = data.finalize().unwrap();
//! assert!(!tar_gz.is_empty());
//! ```
//!
use crate::common::archive::compression::gzip_encoder;
use crate::core::error::{BuildResult, DebpackError, Operation, Stage};
use flate2::write::GzEncoder;
use std::io;
use std::path::Path;
use tar::{EntryType, Header};
use tracing::{debug, trace};

/// File type mask of a Unix mode.
pub const S_IFMT: u32 = 0o170000;
/// Directory type bit.
pub const S_IFDIR: u32 = 0o040000;
/// Symbolic link file type.
pub const S_IFLNK: u32 = 0o120000;
/// Regular file type bit.
pub const S_IFREG: u32 = 0o100000;
/// Largest mode the 8-byte octal header field holds.
pub const MAX_MODE: u32 = 0o7777777;

/// The three kinds of payload entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Symlink,
    Regular,
}

impl EntryKind {
    /// Classifies a mode: the directory bit wins, then the symlink file type;
    /// anything else is stored as a regular file.
    pub fn from_mode(mode: u32) -> Self {
        if mode & S_IFDIR != 0 {
            EntryKind::Directory
        } else if mode & S_IFMT == S_IFLNK {
            EntryKind::Symlink
        } else {
            EntryKind::Regular
        }
    }
}

/// # Nested Archive Builder (`ArchiveBuilder`)
///
/// One gzip-compressed tar stream under construction. Create one per payload,
/// write entries, then call `finalize` exactly once to obtain the bytes.
pub struct ArchiveBuilder {
    stage: Stage,
    tar: tar::Builder<GzEncoder<Vec<u8>>>,
    payload_bytes: u64,
    entries: usize,
    digests: Vec<String>,
}

impl ArchiveBuilder {
    /// Creates an empty builder. `stage` is only used to label errors.
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            tar: tar::Builder::new(gzip_encoder(Vec::new())),
            payload_bytes: 0,
            entries: 0,
            digests: Vec::new(),
        }
    }

    /// # Write Entry (`write_entry`)
    ///
    /// Appends one member to the tar stream.
    ///
    /// ## Arguments
    ///
    /// * `name` - Path inside the payload. Must be relative: stripping the leading
    ///   `/` of an install path is the caller's job.
    /// * `content` - File body, or the link target for symlinks. Ignored for
    ///   directories.
    /// * `mode` - Unix mode including file type bits; decides the entry kind.
    /// * `owner` / `group` - User and group names recorded in the header.
    /// * `mtime` - Modification time in seconds since the Unix epoch.
    ///
    /// ## Errors
    ///
    /// * `DebpackError::InvalidPath` if `name` is empty, absolute or has a `..`
    ///   component.
    /// * `DebpackError::Write` with `Operation::Header` if a header field (mode,
    ///   owner, group) does not fit, or `Operation::Content` if appending the
    ///   member fails.
    pub fn write_entry(
        &mut self,
        name: &str,
        content: &[u8],
        mode: u32,
        owner: &str,
        group: &str,
        mtime: u64,
    ) -> BuildResult<()> {
        if name.is_empty() {
            return Err(DebpackError::invalid_path(name, "entry name is empty"));
        }
        if name.starts_with('/') {
            return Err(DebpackError::invalid_path(
                name,
                "payload entry names must be relative",
            ));
        }
        if name.split('/').any(|component| component == "..") {
            return Err(DebpackError::invalid_path(
                name,
                "parent directory components are not allowed",
            ));
        }
        if mode > MAX_MODE {
            return Err(self.error(
                Operation::Header,
                name,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("mode {:o} does not fit the header", mode),
                ),
            ));
        }

        let mut header = Header::new_gnu();
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(mtime);
        header
            .set_username(owner)
            .map_err(|e| self.error(Operation::Header, name, e))?;
        header
            .set_groupname(group)
            .map_err(|e| self.error(Operation::Header, name, e))?;

        let kind = EntryKind::from_mode(mode);
        let body_len = match kind {
            EntryKind::Directory => {
                header.set_entry_type(EntryType::Directory);
                header.set_mode(mode);
                header.set_size(0);
                self.tar
                    .append_data(&mut header, name, io::empty())
                    .map_err(|e| self.error(Operation::Content, name, e))?;
                0
            }
            EntryKind::Symlink => {
                let target = link_target(name, content)?;
                header.set_entry_type(EntryType::Symlink);
                header.set_mode(mode);
                header.set_size(0);
                self.tar
                    .append_link(&mut header, name, target)
                    .map_err(|e| self.error(Operation::Content, name, e))?;
                0
            }
            EntryKind::Regular => {
                header.set_entry_type(EntryType::Regular);
                header.set_mode(mode | S_IFREG);
                header.set_size(content.len() as u64);
                self.tar
                    .append_data(&mut header, name, content)
                    .map_err(|e| self.error(Operation::Content, name, e))?;
                self.digests
                    .push(format!("{:x}  {}\n", md5::compute(content), name));
                content.len() as u64
            }
        };

        self.payload_bytes += body_len;
        self.entries += 1;
        trace!(
            "{}: wrote {:?} '{}' ({} bytes, mode {:o})",
            self.stage,
            kind,
            name,
            body_len,
            mode
        );
        Ok(())
    }

    /// # Write Synthetic File (`write_simple_file`)
    ///
    /// Appends a regular file with no owner, group or timestamp. Used for the
    /// `control` and `md5sums` members of the control payload.
    pub fn write_simple_file(&mut self, name: &str, content: &[u8], mode: u32) -> BuildResult<()> {
        // Directory/symlink bits would change the entry kind; this is always a file.
        self.write_entry(name, content, (mode & !S_IFMT) | S_IFREG, "", "", 0)
    }

    /// Sum of body lengths written so far. Directories and symlinks count as 0.
    pub fn accumulated_payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    /// The digest records of all regular files, concatenated in write order.
    pub fn digest_manifest(&self) -> String {
        self.digests.concat()
    }

    /// Number of members written so far.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// # Finalize (`finalize`)
    ///
    /// Writes the tar trailer, then finishes the gzip stream, and returns the
    /// complete compressed payload.
    pub fn finalize(self) -> BuildResult<Vec<u8>> {
        let stage = self.stage;
        let encoder = self
            .tar
            .into_inner()
            .map_err(|e| DebpackError::write(stage, Operation::Close, "tar trailer", e))?;
        let bytes = encoder
            .finish()
            .map_err(|e| DebpackError::write(stage, Operation::Close, "gzip stream", e))?;
        debug!(
            "{}: finalized {} entries, {} payload bytes, {} compressed bytes",
            stage,
            self.entries,
            self.payload_bytes,
            bytes.len()
        );
        Ok(bytes)
    }

    fn error(&self, operation: Operation, name: &str, source: io::Error) -> DebpackError {
        DebpackError::write(self.stage, operation, name, source)
    }
}

/// The link target stored verbatim from `content`.
#[cfg(unix)]
fn link_target<'a>(_name: &str, content: &'a [u8]) -> BuildResult<&'a Path> {
    use std::os::unix::ffi::OsStrExt;
    Ok(Path::new(std::ffi::OsStr::from_bytes(content)))
}

#[cfg(not(unix))]
fn link_target<'a>(name: &str, content: &'a [u8]) -> BuildResult<&'a Path> {
    std::str::from_utf8(content)
        .map(Path::new)
        .map_err(|_| DebpackError::invalid_path(name, "symlink target is not valid UTF-8"))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tar::Archive;

    struct Member {
        path: String,
        kind: EntryType,
        size: u64,
        mode: u32,
        link: Option<String>,
        body: Vec<u8>,
        owner: Option<String>,
    }

    fn read_members(tar_gz: &[u8]) -> Vec<Member> {
        let mut archive = Archive::new(GzDecoder::new(tar_gz));
        let mut members = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let header = entry.header().clone();
            let mut body = Vec::new();
            entry.read_to_end(&mut body).unwrap();
            members.push(Member {
                path: entry.path().unwrap().to_string_lossy().into_owned(),
                kind: header.entry_type(),
                size: header.size().unwrap(),
                mode: header.mode().unwrap(),
                link: header
                    .link_name()
                    .unwrap()
                    .map(|l| l.to_string_lossy().into_owned()),
                body,
                owner: header.username().unwrap().map(str::to_string),
            });
        }
        members
    }

    #[test]
    fn test_classify_modes() {
        assert_eq!(EntryKind::from_mode(0o40755), EntryKind::Directory);
        assert_eq!(EntryKind::from_mode(0o120777), EntryKind::Symlink);
        assert_eq!(EntryKind::from_mode(0o100644), EntryKind::Regular);
        assert_eq!(EntryKind::from_mode(0o644), EntryKind::Regular);
        // Only the directory bit decides, even when other type bits are set.
        assert_eq!(EntryKind::from_mode(0o140755), EntryKind::Directory);
    }

    #[test]
    fn test_entry_kinds_in_stream() {
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        builder
            .write_entry("opt/app", b"", 0o40755, "root", "root", 0)
            .unwrap();
        builder
            .write_entry("opt/app/run.sh", b"#!/bin/sh\n", 0o755, "root", "staff", 42)
            .unwrap();
        builder
            .write_entry("opt/app/current", b"/opt/app/run.sh", 0o120777, "root", "root", 0)
            .unwrap();
        assert_eq!(builder.entry_count(), 3);
        let bytes = builder.finalize().unwrap();

        let members = read_members(&bytes);
        assert_eq!(members.len(), 3);

        assert_eq!(members[0].path.trim_end_matches('/'), "opt/app");
        assert_eq!(members[0].kind, EntryType::Directory);
        assert_eq!(members[0].size, 0);
        assert_eq!(members[0].mode, 0o40755);

        assert_eq!(members[1].kind, EntryType::Regular);
        assert_eq!(members[1].mode, 0o100755);
        assert_eq!(members[1].body, b"#!/bin/sh\n");
        assert_eq!(members[1].owner.as_deref(), Some("root"));

        assert_eq!(members[2].kind, EntryType::Symlink);
        assert_eq!(members[2].size, 0);
        assert!(members[2].body.is_empty());
        assert_eq!(members[2].link.as_deref(), Some("/opt/app/run.sh"));
    }

    #[test]
    fn test_digests_only_for_regular_files() {
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        builder
            .write_entry("var/lib/debpack", b"", 0o40755, "", "", 0)
            .unwrap();
        builder
            .write_entry("var/lib/debpack/sample.txt", b"testsample\n", 0o600, "", "", 0)
            .unwrap();
        builder
            .write_entry("var/lib/debpack/link", b"sample.txt", 0o120777, "", "", 0)
            .unwrap();

        let expected = format!(
            "{:x}  var/lib/debpack/sample.txt\n",
            md5::compute(b"testsample\n")
        );
        assert_eq!(builder.digest_manifest(), expected);
        assert_eq!(builder.accumulated_payload_bytes(), 11);
    }

    #[test]
    fn test_simple_file_is_always_regular() {
        let mut builder = ArchiveBuilder::new(Stage::ControlPayload);
        builder
            .write_simple_file("control", b"Package: x\n", 0o644)
            .unwrap();
        // A stray directory bit must not turn a synthetic file into a directory.
        builder.write_simple_file("md5sums", b"", 0o40644).unwrap();
        let members = read_members(&builder.finalize().unwrap());
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.kind == EntryType::Regular));
        assert_eq!(members[0].mode, 0o100644);
        assert_eq!(members[1].mode, 0o100644);
        assert_eq!(members[0].owner.as_deref().unwrap_or(""), "");
    }

    #[test]
    fn test_absolute_name_is_rejected() {
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        let err = builder
            .write_entry("/etc/passwd", b"x", 0o644, "", "", 0)
            .unwrap_err();
        assert!(matches!(err, DebpackError::InvalidPath { .. }));
        assert_eq!(builder.entry_count(), 0);
    }

    #[test]
    fn test_parent_component_is_rejected_before_writing() {
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        for name in ["x/../y", "../etc/passwd", "opt/.."] {
            let err = builder.write_entry(name, b"", 0o644, "", "", 0).unwrap_err();
            assert!(
                matches!(err, DebpackError::InvalidPath { .. }),
                "{name}: unexpected error {err}"
            );
        }
        // Dots inside a component are ordinary names.
        builder
            .write_entry("opt/..hidden/a..b", b"", 0o644, "", "", 0)
            .unwrap();
        assert_eq!(builder.entry_count(), 1);
    }

    #[test]
    fn test_oversized_mode_is_header_error() {
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        let err = builder
            .write_entry("etc/app.conf", b"x", 0o7000000644, "", "", 0)
            .unwrap_err();
        match err {
            DebpackError::Write {
                operation, entry, ..
            } => {
                assert_eq!(operation, Operation::Header);
                assert_eq!(entry, "etc/app.conf");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(builder.entry_count(), 0);
        assert_eq!(builder.accumulated_payload_bytes(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_target_is_verbatim_bytes() {
        use std::os::unix::ffi::OsStrExt;
        let target = b"caf\xe9.txt";
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        builder
            .write_entry("opt/link", target, 0o120777, "", "", 0)
            .unwrap();
        let bytes = builder.finalize().unwrap();
        let mut archive = Archive::new(GzDecoder::new(&bytes[..]));
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        let link = entry.header().link_name().unwrap().unwrap();
        assert_eq!(link.as_os_str().as_bytes(), target);
    }

    #[test]
    fn test_oversized_owner_is_header_error() {
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        let owner = "x".repeat(64);
        let err = builder
            .write_entry("etc/app.conf", b"x", 0o644, &owner, "root", 0)
            .unwrap_err();
        match err {
            DebpackError::Write {
                stage,
                operation,
                entry,
                ..
            } => {
                assert_eq!(stage, Stage::DataPayload);
                assert_eq!(operation, Operation::Header);
                assert_eq!(entry, "etc/app.conf");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_long_paths_survive() {
        let long = format!("usr/share/{}/file.txt", "d".repeat(150));
        let mut builder = ArchiveBuilder::new(Stage::DataPayload);
        builder
            .write_entry(&long, b"body", 0o644, "root", "root", 0)
            .unwrap();
        let members = read_members(&builder.finalize().unwrap());
        assert_eq!(members[0].path, long);
    }

    #[test]
    fn test_empty_builder_finalizes() {
        let bytes = ArchiveBuilder::new(Stage::DataPayload).finalize().unwrap();
        assert!(read_members(&bytes).is_empty());
    }
}
