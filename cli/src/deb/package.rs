//! # Package Assembler (`deb::package`)
//!
//! File: cli/src/deb/package.rs
//!
//! ## Overview
//!
//! `Package` holds the metadata and the logical file set of one `.deb` and turns
//! them into the final byte stream. It requires no filesystem access: files are
//! registered with `add_file` and the package is written to any `io::Write`.
//!
//! ## Architecture
//!
//! `serialize` runs these steps, aborting on the first error:
//! 1. Sort the stored paths byte-wise, so output does not depend on insertion order.
//! 2. Feed every entry, path made relative, to the data payload builder.
//! 3. Derive `Installed-Size` (payload bytes / 1024, truncated) and capture the
//!    digest manifest; finalize `data.tar.gz`.
//! 4. Render `control`; write `control` and `md5sums` to the control payload
//!    builder; finalize `control.tar.gz`.
//! 5. Write the `ar` container: `debian-binary`, `control.tar.gz`, `data.tar.gz`.
//!
//! Both payloads are complete in memory before the first byte reaches the sink.
//! If writing to the sink fails midway, the sink holds a partial package and
//! must be discarded.
//!
//! `serialize` takes the package by value: a package is written exactly once.
//!
//! ## Usage
//!
//! ```rust
//! use debpack::deb::{FileEntry, Package, PackageMetadata};
//!
//! let mut pkg = Package::new(PackageMetadata::new("hello", "1.0", "all"));
//! pkg.add_file(FileEntry::directory("/usr/share/hello", 0o755)).unwrap();
//! pkg.add_file(FileEntry::regular("/usr/share/hello/greeting", "hi\n", 0o644)).unwrap();
//!
//! let mut deb = Vec::new();
//! let summary = pkg.serialize(&mut deb).unwrap();
//! assert_eq!(summary.regular_files, 1);
//! assert!(deb.starts_with(b"!<arch>\n"));
//! ```
//!
use crate::common::archive::ar::{ContainerMember, ContainerWriter};
use crate::common::archive::tar::{ArchiveBuilder, EntryKind};
use crate::core::error::{BuildResult, Stage};
use crate::core::templating::render_control;
use crate::deb::entry::{normalize_path, FileEntry};
use crate::deb::metadata::PackageMetadata;
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, info};

/// Content of the `debian-binary` member.
pub const DEBIAN_BINARY_VERSION: &[u8] = b"2.0\n";
/// Mode of every outer container member.
pub const MEMBER_MODE: u32 = 0o100644;
/// Mode of the `control` and `md5sums` members.
pub const CONTROL_FILE_MODE: u32 = 0o644;

/// What `serialize` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// The metadata as written, with `installed_size_kib` filled in.
    pub metadata: PackageMetadata,
    /// Members of `data.tar.gz`.
    pub data_entries: usize,
    /// Regular files, i.e. lines of `md5sums`.
    pub regular_files: usize,
    /// Uncompressed body bytes of `data.tar.gz`.
    pub payload_bytes: u64,
    pub control_tar_gz_bytes: usize,
    pub data_tar_gz_bytes: usize,
}

/// The state of a particular deb file.
#[derive(Debug, Clone)]
pub struct Package {
    metadata: PackageMetadata,
    files: HashMap<String, FileEntry>,
}

impl Package {
    pub fn new(metadata: PackageMetadata) -> Self {
        Self {
            metadata,
            files: HashMap::new(),
        }
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether an entry exists at `path` (compared after normalization).
    pub fn contains(&self, path: &str) -> bool {
        normalize_path(path)
            .map(|p| self.files.contains_key(&p))
            .unwrap_or(false)
    }

    /// # Add File (`add_file`)
    ///
    /// Inserts `entry`, replacing any entry already stored at the same path.
    /// The root directory is silently ignored: a deb must not contain it.
    ///
    /// ## Errors
    ///
    /// `DebpackError::InvalidPath` if the path is relative, contains `..`, or
    /// contains a NUL byte (see `normalize_path`).
    pub fn add_file(&mut self, mut entry: FileEntry) -> BuildResult<()> {
        let path = normalize_path(&entry.path)?;
        if path == "/" {
            debug!("Ignoring root directory entry");
            return Ok(());
        }
        entry.path = path.clone();
        if self.files.insert(path.clone(), entry).is_some() {
            debug!("Replaced existing entry at '{}'", path);
        }
        Ok(())
    }

    /// # Serialize (`serialize`)
    ///
    /// Assembles the package and writes it to `out`. See the module docs for
    /// the exact steps.
    ///
    /// ## Returns
    ///
    /// * `BuildResult<BuildSummary>` - Statistics of the written package.
    pub fn serialize<W: Write>(self, out: W) -> BuildResult<BuildSummary> {
        let Package { mut metadata, files } = self;

        // Add all of the files, sorted alphabetically.
        let mut paths: Vec<&String> = files.keys().collect();
        paths.sort();

        let mut data = ArchiveBuilder::new(Stage::DataPayload);
        let mut regular_files = 0;
        for path in paths {
            let entry = &files[path];
            let relative = path.trim_start_matches('/');
            data.write_entry(
                relative,
                &entry.content,
                entry.mode,
                &entry.owner,
                &entry.group,
                entry.mtime,
            )?;
            if entry.kind() == EntryKind::Regular {
                regular_files += 1;
            }
        }
        let md5sums = data.digest_manifest();
        let payload_bytes = data.accumulated_payload_bytes();
        let data_entries = data.entry_count();
        metadata.installed_size_kib = payload_bytes / 1024;
        let data_tar_gz = data.finalize()?;
        info!(
            "Built data.tar.gz: {} entries, {} payload bytes",
            data_entries, payload_bytes
        );

        let control_text = render_control(&metadata)?;
        let mut control = ArchiveBuilder::new(Stage::ControlPayload);
        control.write_simple_file("control", control_text.as_bytes(), CONTROL_FILE_MODE)?;
        control.write_simple_file("md5sums", md5sums.as_bytes(), CONTROL_FILE_MODE)?;
        let control_tar_gz = control.finalize()?;
        info!("Built control.tar.gz for {} {}", metadata.name, metadata.version);

        let mut container = ContainerWriter::new(out);
        container.write_global_header()?;
        for (name, content) in [
            ("debian-binary", DEBIAN_BINARY_VERSION),
            ("control.tar.gz", control_tar_gz.as_slice()),
            ("data.tar.gz", data_tar_gz.as_slice()),
        ] {
            container.append_member(&ContainerMember {
                name,
                mode: MEMBER_MODE,
                content,
            })?;
        }
        debug!("Wrote {} container members", container.member_count());
        container.into_inner()?;

        Ok(BuildSummary {
            metadata,
            data_entries,
            regular_files,
            payload_bytes,
            control_tar_gz_bytes: control_tar_gz.len(),
            data_tar_gz_bytes: data_tar_gz.len(),
        })
    }
}
