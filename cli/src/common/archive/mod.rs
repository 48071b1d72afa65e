//! # Debpack Archive Formats Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the archive formats a Debian package is made of.
//! A `.deb` is an `ar` container whose members include two gzip-compressed
//! tar payloads; each layer lives in its own submodule.
//!
//! ## Architecture
//!
//! - **`tar`**: `ArchiveBuilder`, the in-memory builder of one gzip-compressed tar
//!   payload, with payload size accounting and the md5 digest manifest.
//! - **`ar`**: `ContainerWriter`, the writer of the outer `ar` container.
//! - **`compression`**: Gzip encoder construction and transparent gzip input.
//!
//! ## Usage
//!
//! ```rust
//! use debpack::common::archive::ar::{ContainerMember, ContainerWriter};
//! use debpack::common::archive::tar::ArchiveBuilder;
//! use debpack::core::error::Stage;
//!
//! let mut control = ArchiveBuilder::new(Stage::ControlPayload);
//! control.write_simple_file("control", b"Package: x\n", 0o644).unwrap();
//! let control_tar_gz = control.finalize().unwrap();
//!
//! let mut deb = ContainerWriter::new(Vec::new());
//! deb.write_global_header().unwrap();
//! deb.append_member(&ContainerMember { name: "control.tar.gz", mode: 0o100644, content: &control_tar_gz }).unwrap();
//! let bytes = deb.into_inner().unwrap();
//! assert!(bytes.starts_with(b"!<arch>\n"));
//! ```
//!

pub mod ar;
pub mod compression;
pub mod tar;
