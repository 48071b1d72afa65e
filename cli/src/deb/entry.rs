//! # File Entries (`deb::entry`)
//!
//! File: cli/src/deb/entry.rs
//!
//! ## Overview
//!
//! A `FileEntry` is one logical file of the installed filesystem: a directory, a
//! symbolic link, or a regular file. The kind is not stored separately; it is
//! read from the file type bits of `mode` (see `EntryKind::from_mode`), exactly as
//! the data payload builder will classify it.
//!
//! Paths are absolute and slash-separated. `normalize_path` gives every path a
//! single canonical spelling so that `/opt/app/`, `/opt//app` and `/opt/./app`
//! all address the same entry.
//!
use crate::common::archive::tar::{EntryKind, S_IFDIR, S_IFLNK, S_IFMT, S_IFREG};
use crate::core::error::{BuildResult, DebpackError};

/// A particular file's entry and data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntry {
    /// Absolute install path, e.g. `/usr/bin/tool`.
    pub path: String,
    /// File body; the link target for symlinks; empty for directories.
    pub content: Vec<u8>,
    /// Unix mode, file type bits included.
    pub mode: u32,
    pub owner: String,
    pub group: String,
    /// Seconds since the Unix epoch.
    pub mtime: u64,
}

impl FileEntry {
    /// A directory entry. Permission bits come from `mode`; the type is forced.
    pub fn directory(path: impl Into<String>, mode: u32) -> Self {
        Self {
            path: path.into(),
            mode: (mode & !S_IFMT) | S_IFDIR,
            ..Default::default()
        }
    }

    /// A regular file entry.
    pub fn regular(path: impl Into<String>, content: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: (mode & !S_IFMT) | S_IFREG,
            ..Default::default()
        }
    }

    /// A symbolic link pointing at `target`, with mode `0o120777`.
    pub fn symlink(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: target.into().into_bytes(),
            mode: S_IFLNK | 0o777,
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>, group: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.group = group.into();
        self
    }

    pub fn with_mtime(mut self, mtime: u64) -> Self {
        self.mtime = mtime;
        self
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mode(self.mode)
    }
}

/// # Normalize Install Path (`normalize_path`)
///
/// Returns the canonical form of an absolute install path: a single leading
/// `/`, no empty or `.` components, no trailing `/`. The root normalizes to `/`.
///
/// ## Errors
///
/// `DebpackError::InvalidPath` if the path is not absolute, contains a `..`
/// component, or contains a NUL byte.
pub fn normalize_path(raw: &str) -> BuildResult<String> {
    if !raw.starts_with('/') {
        return Err(DebpackError::invalid_path(raw, "path must be absolute"));
    }
    if raw.contains('\0') {
        return Err(DebpackError::invalid_path(raw, "path contains a NUL byte"));
    }
    let mut components = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                return Err(DebpackError::invalid_path(
                    raw,
                    "parent directory components are not allowed",
                ))
            }
            other => components.push(other),
        }
    }
    Ok(format!("/{}", components.join("/")))
}
