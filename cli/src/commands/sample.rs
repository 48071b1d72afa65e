//! # Handler for `debpack sample`
//!
//! File: cli/src/commands/sample.rs
//!
//! Emits `debsample`, a small package with known content: one directory, two
//! regular files and a symlink under `/var/lib/debpack`. Useful for comparing
//! output against other `.deb` tooling.
//!
use crate::commands::write_package;
use crate::core::config;
use crate::core::error::{BuildResult, Result};
use crate::deb::{FileEntry, Package, PackageMetadata};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Write the built-in sample package")]
pub struct SampleArgs {
    /// Output file [default: stdout, or `<build.output_dir>/debsample_0.0.1_all.deb`].
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// The `debsample` package.
pub fn sample_package() -> BuildResult<Package> {
    let mut package = Package::new(
        PackageMetadata::new("debsample", "0.0.1", "all")
            .with_maintainer("unknown")
            .with_description("example package"),
    );
    let entries = [
        FileEntry::directory("/var/lib/debpack/", 0o755),
        FileEntry::regular("/var/lib/debpack/sample.txt", "testsample\n", 0o600),
        FileEntry::regular("/var/lib/debpack/sample2.txt", "testsample2\n", 0o644),
        FileEntry::symlink("/var/lib/debpack/sample3_link.txt", "/var/lib/debpack/sample.txt"),
    ];
    for entry in entries {
        package.add_file(entry.with_owner("root", "root"))?;
    }
    Ok(package)
}

pub fn handle_sample(args: SampleArgs) -> Result<()> {
    info!("Handling sample command...");
    let cfg = config::load_config().context("Failed to load debpack configuration")?;
    let package = sample_package()?;
    write_package(package, args.file.as_deref(), &cfg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_package_contents() {
        let package = sample_package().unwrap();
        assert_eq!(package.len(), 4);
        assert!(package.contains("/var/lib/debpack"));
        assert!(package.contains("/var/lib/debpack/sample3_link.txt"));

        let summary = package.serialize(Vec::new()).unwrap();
        assert_eq!(summary.regular_files, 2);
        assert_eq!(summary.payload_bytes, 23);
        assert_eq!(summary.metadata.installed_size_kib, 0);
    }
}
