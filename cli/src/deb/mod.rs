//! # Debian Package Model (`deb`)
//!
//! File: cli/src/deb/mod.rs
//!
//! The package assembler and the types it works on. Everything here builds the
//! `.deb` in memory; reading sources and writing results is left to callers.
//!
//! - `metadata`: control fields of a package.
//! - `entry`: logical files and path normalization.
//! - `package`: the assembler (`Package::add_file`, `Package::serialize`).
//! - `source`: conversion of tar streams and directories into entries.
//!
pub mod entry;
pub mod metadata;
pub mod package;
pub mod source;

pub use crate::common::archive::tar::EntryKind;
pub use entry::{normalize_path, FileEntry};
pub use metadata::PackageMetadata;
pub use package::{BuildSummary, Package};
pub use source::{entries_from_dir, entries_from_tar, package_from_entries, SourceOptions};
