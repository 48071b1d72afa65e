//! # Entry Sources (`deb::source`)
//!
//! File: cli/src/deb/source.rs
//!
//! ## Overview
//!
//! Turns existing file trees into `FileEntry` lists that a `Package` can take:
//! - **`entries_from_tar`**: a tar stream, plain or gzip-compressed.
//! - **`entries_from_dir`**: a directory on the local filesystem.
//!
//! Both place every input path below `SourceOptions::prefix` and map the input's
//! file type onto the mode bits the assembler classifies by:
//!
//! ```text
//! directory  ->  0o040000 | permissions
//! symlink    ->  0o120000 | permissions, content = link target
//! file       ->  0o100000 | permissions, content = body
//! ```
//!
//! Hard links in a tar stream become regular files holding a copy of their
//! target, which must appear earlier in the stream. Devices, FIFOs and sockets
//! cannot be represented and are skipped with a warning.
//!
use crate::common::archive::compression::decompress_if_gzip;
use crate::common::archive::tar::{S_IFDIR, S_IFLNK, S_IFREG};
use crate::core::error::{BuildResult, DebpackError, Result};
use crate::deb::entry::{normalize_path, FileEntry};
use crate::deb::metadata::PackageMetadata;
use crate::deb::package::Package;
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tar::EntryType;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const PERMISSION_BITS: u32 = 0o7777;
const DEFAULT_ID_NAME: &str = "root";

/// How input paths and attributes are mapped onto package entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Install prefix every input path is placed under.
    pub prefix: String,
    /// Owner name for every entry, replacing the input's.
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Modification time for every entry, replacing the input's.
    pub mtime: Option<u64>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            prefix: "/".to_string(),
            owner: None,
            group: None,
            mtime: None,
        }
    }
}

impl SourceOptions {
    /// The absolute install path of `relative` (an input path) below the prefix.
    fn install_path(&self, relative: &str) -> BuildResult<String> {
        let joined = format!("{}/{}", self.prefix.trim_end_matches('/'), relative);
        if !self.prefix.starts_with('/') {
            return Err(DebpackError::invalid_path(
                &self.prefix,
                "install prefix must be absolute",
            ));
        }
        normalize_path(&joined)
    }

    fn owner_or<'a>(&'a self, input: Option<&'a str>) -> &'a str {
        self.owner
            .as_deref()
            .or(input.filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_ID_NAME)
    }

    fn group_or<'a>(&'a self, input: Option<&'a str>) -> &'a str {
        self.group
            .as_deref()
            .or(input.filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_ID_NAME)
    }
}

/// # Entries From Tar (`entries_from_tar`)
///
/// Reads every member of a tar stream into a `FileEntry`. Gzip input is detected
/// by its magic bytes and decompressed transparently.
///
/// ## Errors
///
/// Returns an `Err` if the stream is not a readable tar archive, a member path is
/// not UTF-8, a member path escapes the prefix (`..`), or a hard link points at
/// no earlier regular file.
pub fn entries_from_tar<R: Read>(reader: R, opts: &SourceOptions) -> Result<Vec<FileEntry>> {
    let reader = decompress_if_gzip(reader).context("Failed to read input stream")?;
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();
    // Regular members read so far, by install path, for resolving hard links.
    let mut regular_files: HashMap<String, (Vec<u8>, u32)> = HashMap::new();

    for member in archive.entries().context("Failed to read tar archive")? {
        let mut member = member.context("Failed to read tar member header")?;
        let raw_path = member.path().context("Invalid tar member path")?;
        let name = raw_path
            .to_str()
            .ok_or_else(|| {
                DebpackError::invalid_path(raw_path.to_string_lossy(), "path is not valid UTF-8")
            })?
            .to_string();

        let header = member.header();
        let permissions = header.mode().unwrap_or(0o644) & PERMISSION_BITS;
        let entry_type = header.entry_type();
        let owner = opts.owner_or(header.username().ok().flatten()).to_string();
        let group = opts.group_or(header.groupname().ok().flatten()).to_string();
        let mtime = match opts.mtime {
            Some(t) => t,
            None => header.mtime().unwrap_or(0),
        };

        let path = opts.install_path(&name)?;
        let (mode, content) = match entry_type {
            EntryType::Directory => (S_IFDIR | permissions, Vec::new()),
            EntryType::Symlink => {
                let target = member
                    .link_name_bytes()
                    .map(|t| t.into_owned())
                    .unwrap_or_default();
                (S_IFLNK | permissions, target)
            }
            EntryType::Regular | EntryType::Continuous => {
                let mut body = Vec::new();
                member
                    .read_to_end(&mut body)
                    .with_context(|| format!("Failed to read tar member '{}'", name))?;
                let mode = S_IFREG | permissions;
                regular_files.insert(path.clone(), (body.clone(), mode));
                (mode, body)
            }
            EntryType::Link => {
                // A hard link shares its target's inode; store it as a copy.
                let target = member
                    .link_name_bytes()
                    .map(|t| String::from_utf8_lossy(&t).into_owned())
                    .unwrap_or_default();
                let target_path = opts.install_path(&target)?;
                let (body, mode) = regular_files.get(&target_path).cloned().ok_or_else(|| {
                    DebpackError::invalid_path(
                        &name,
                        format!(
                            "hard link target '{}' is not a regular file earlier in the archive",
                            target
                        ),
                    )
                })?;
                debug!("Hard link '{}' copies '{}'", name, target_path);
                regular_files.insert(path.clone(), (body.clone(), mode));
                (mode, body)
            }
            other => {
                warn!("Skipping tar member '{}' of unsupported type {:?}", name, other);
                continue;
            }
        };

        debug!("Tar member '{}' -> '{}' (mode {:o})", name, path, mode);
        entries.push(FileEntry {
            path,
            content,
            mode,
            owner,
            group,
            mtime,
        });
    }

    info!("Read {} entries from tar input", entries.len());
    Ok(entries)
}

/// # Entries From Directory (`entries_from_dir`)
///
/// Walks `root` without following symlinks, in file name order, and returns an
/// entry for `root` itself and everything below it. `root` maps to the prefix.
///
/// Owner and group default to `root`: local ownership is not carried over.
pub fn entries_from_dir(root: &Path, opts: &SourceOptions) -> Result<Vec<FileEntry>> {
    if !root.is_dir() {
        anyhow::bail!(DebpackError::FileSystem(format!(
            "Source is not a directory: {:?}",
            root
        )));
    }

    let mut entries = Vec::new();
    for dir_entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let dir_entry = dir_entry.with_context(|| format!("Failed to walk {:?}", root))?;
        let src_path = dir_entry.path();
        let relative = pathdiff::diff_paths(src_path, root).ok_or_else(|| {
            DebpackError::FileSystem(format!("Cannot relate {:?} to {:?}", src_path, root))
        })?;
        let relative = relative.to_str().ok_or_else(|| {
            DebpackError::invalid_path(src_path.display().to_string(), "path is not valid UTF-8")
        })?;
        // `diff_paths` uses the platform separator.
        let relative = relative.replace(std::path::MAIN_SEPARATOR, "/");

        let metadata = dir_entry
            .metadata()
            .with_context(|| format!("Failed to read metadata of {:?}", src_path))?;
        let file_type = metadata.file_type();
        let permissions = permission_bits(&metadata);

        let (mode, content) = if file_type.is_dir() {
            (S_IFDIR | permissions, Vec::new())
        } else if file_type.is_symlink() {
            let target = fs::read_link(src_path)
                .with_context(|| format!("Failed to read link {:?}", src_path))?;
            let target = target.to_str().ok_or_else(|| {
                DebpackError::invalid_path(
                    src_path.display().to_string(),
                    "link target is not valid UTF-8",
                )
            })?;
            (S_IFLNK | 0o777, target.as_bytes().to_vec())
        } else if file_type.is_file() {
            let body =
                fs::read(src_path).with_context(|| format!("Failed to read {:?}", src_path))?;
            (S_IFREG | permissions, body)
        } else {
            warn!("Skipping {:?}: not a file, directory or symlink", src_path);
            continue;
        };

        let mtime = match opts.mtime {
            Some(t) => t,
            None => metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        let path = opts.install_path(&relative)?;
        debug!("{:?} -> '{}' (mode {:o})", src_path, path, mode);
        entries.push(FileEntry {
            path,
            content,
            mode,
            owner: opts.owner_or(None).to_string(),
            group: opts.group_or(None).to_string(),
            mtime,
        });
    }

    info!("Read {} entries from {:?}", entries.len(), root);
    Ok(entries)
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & PERMISSION_BITS
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

/// Builds a package holding `entries`, later entries replacing earlier ones at
/// the same path.
pub fn package_from_entries(
    metadata: PackageMetadata,
    entries: impl IntoIterator<Item = FileEntry>,
) -> BuildResult<Package> {
    let mut package = Package::new(metadata);
    for entry in entries {
        package.add_file(entry)?;
    }
    Ok(package)
}
