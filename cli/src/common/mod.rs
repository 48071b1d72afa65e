//! # Debpack Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared, format-level building blocks used by the package assembler and the
//! command handlers. Nothing here knows about package metadata.
//!
//! - **`archive`**: tar payload builder, `ar` container writer, gzip helpers.
//! - **`fs`**: Output sinks and input sources (files or standard streams).
//!

/// Archive formats making up a `.deb` (tar, ar, gzip).
pub mod archive;
/// Filesystem and standard stream I/O helpers.
pub mod fs;
