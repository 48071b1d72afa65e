//! # Debpack Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem and standard stream helpers used by the command handlers to read
//! tar input and deliver finished packages.
//!

/// Contains input/output helpers (e.g., `open_input`, `write_output`, `ensure_dir_exists`).
pub mod io;
