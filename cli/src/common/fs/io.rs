//! # Debpack Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module centralizes the input/output plumbing of the command layer:
//! where tar input comes from and where finished packages go. The package core
//! never touches the filesystem; it writes into an in-memory buffer that these
//! helpers then deliver.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: Creates a directory (and parents) if missing, and
//!   fails if the path exists but is not a directory.
//! - **`open_input`**: Opens a file for reading, or standard input when no path
//!   is given.
//! - **`write_bytes_to_file`**: Writes a complete buffer to a file, creating the
//!   parent directory first.
//! - **`write_output`**: Writes a complete buffer to a file or standard output.
//!
//! Packages are written only once fully assembled, so a failed build never
//! leaves a truncated `.deb` behind.
//!
use crate::core::error::{DebpackError, Result};
use anyhow::Context;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist it is created, including any parent directories.
///
/// # Errors
///
/// Returns an `Err` if the path exists but is not a directory, or if creating
/// the directory fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(DebpackError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Opens `path` for reading, or standard input when `path` is `None`.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) => {
            let file =
                fs::File::open(p).with_context(|| format!("Failed to open file {:?} for reading", p))?;
            debug!("Reading input from {:?}", p);
            Ok(Box::new(file))
        }
        None => {
            // Always shown, regardless of the log filter.
            eprintln!("Reading tar content from stdin.");
            debug!("Reading input from stdin");
            Ok(Box::new(io::stdin()))
        }
    }
}

/// Writes `bytes` to `path`, overwriting an existing file and creating the
/// parent directory if needed.
pub fn write_bytes_to_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write to file {:?}", path))?;
    info!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

/// Writes `bytes` to `path`, or to standard output when `path` is `None`.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) => write_bytes_to_file(p, bytes),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(bytes)
                .and_then(|_| handle.flush())
                .context("Failed to write package to stdout")?;
            debug!("Wrote {} bytes to stdout", bytes.len());
            Ok(())
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_path_is_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "hello")?;
        let result = ensure_dir_exists(&file_path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Path exists but is not a directory"));
        Ok(())
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("out/pkg.deb");
        write_output(Some(&file_path), b"!<arch>\n")?;
        let mut content = Vec::new();
        open_input(Some(&file_path))?.read_to_end(&mut content)?;
        assert_eq!(content, b"!<arch>\n");
        Ok(())
    }

    #[test]
    fn test_open_input_missing_file() -> Result<()> {
        let base_dir = tempdir()?;
        let result = open_input(Some(&base_dir.path().join("nonexistent.tar")));
        assert!(result.is_err());
        Ok(())
    }
}
