//! # Debpack Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The subcommands of the `debpack` binary and the arguments they share:
//!
//! - `from_tar`: package the contents of a tar stream.
//! - `from_dir`: package a directory tree.
//! - `sample`: emit the built-in sample package.
//!
//! `MetadataArgs` and `SourceArgs` are flattened into the source-based
//! subcommands. Both resolve against the loaded `Config`: a flag always wins over
//! a configured value, which wins over the built-in default.
//!
//! Every subcommand ends in `write_package`, which serializes into memory first
//! so that nothing is written when assembly fails.
//!
use crate::common::fs::io::write_output;
use crate::core::config::{parse_mtime, Config};
use crate::core::error::{DebpackError, Result};
use crate::deb::{BuildSummary, Package, PackageMetadata, SourceOptions};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod from_dir;
pub mod from_tar;
pub mod sample;

/// Control field flags.
#[derive(Args, Debug, Clone)]
pub struct MetadataArgs {
    /// Package name.
    #[arg(long, value_parser = non_empty)]
    pub name: String,
    /// Package version.
    #[arg(long = "version", value_name = "VERSION", value_parser = non_empty)]
    pub pkg_version: String,
    /// Architecture [default: `package.architecture` from config, else "all"].
    #[arg(long = "arch", value_name = "ARCH")]
    pub architecture: Option<String>,
    /// Maintainer [default: `package.maintainer` from config, else "unknown"].
    #[arg(long)]
    pub maintainer: Option<String>,
    /// One-line description.
    #[arg(long)]
    pub description: Option<String>,
}

impl MetadataArgs {
    pub fn resolve(&self, cfg: &Config) -> Result<PackageMetadata> {
        let architecture = self
            .architecture
            .as_deref()
            .unwrap_or_else(|| cfg.architecture());
        if architecture.is_empty() || architecture.chars().any(char::is_whitespace) {
            anyhow::bail!(DebpackError::ArgumentParsing(format!(
                "Invalid architecture '{}'",
                architecture
            )));
        }
        let metadata = PackageMetadata::new(&self.name, &self.pkg_version, architecture)
            .with_maintainer(self.maintainer.as_deref().unwrap_or_else(|| cfg.maintainer()))
            .with_description(
                self.description
                    .as_deref()
                    .unwrap_or_else(|| cfg.description()),
            );
        debug!("Resolved package metadata: {:?}", metadata);
        Ok(metadata)
    }
}

/// Flags controlling how source entries are mapped and where the package goes.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Output file [default: stdout, or `<build.output_dir>/<name>_<version>_<arch>.deb`].
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
    /// Install prefix for all source paths.
    #[arg(long, default_value = "/")]
    pub prefix: String,
    /// Owner name for every entry.
    #[arg(long)]
    pub owner: Option<String>,
    /// Group name for every entry.
    #[arg(long)]
    pub group: Option<String>,
    /// Modification time for every entry (epoch seconds or RFC 3339).
    #[arg(long)]
    pub mtime: Option<String>,
}

impl SourceArgs {
    pub fn source_options(&self, cfg: &Config) -> Result<SourceOptions> {
        let mtime = match self.mtime.as_deref() {
            Some(raw) => Some(parse_mtime(raw).context("Invalid --mtime value")?),
            None => cfg.mtime()?,
        };
        Ok(SourceOptions {
            prefix: self.prefix.clone(),
            owner: self.owner.clone().or_else(|| cfg.build.owner.clone()),
            group: self.group.clone().or_else(|| cfg.build.group.clone()),
            mtime,
        })
    }
}

fn non_empty(value: &str) -> std::result::Result<String, String> {
    if value.trim().is_empty() {
        Err("value must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Where the package is written: the explicit file, else the configured output
/// directory, else `None` for stdout.
pub fn resolve_destination(
    file: Option<&Path>,
    cfg: &Config,
    metadata: &PackageMetadata,
) -> Option<PathBuf> {
    match (file, cfg.build.output_dir.as_deref()) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(dir)) => Some(Path::new(dir).join(metadata.deb_file_name())),
        (None, None) => None,
    }
}

/// # Write Package (`write_package`)
///
/// Serializes `package` into memory and then delivers it to its destination
/// (see `resolve_destination`). A summary line is printed when the package goes
/// to a file; stdout is left to the package bytes otherwise.
pub fn write_package(package: Package, file: Option<&Path>, cfg: &Config) -> Result<BuildSummary> {
    let destination = resolve_destination(file, cfg, package.metadata());
    let entries = package.len();

    let mut deb = Vec::new();
    let summary = package
        .serialize(&mut deb)
        .context("Failed to assemble package")?;
    info!(
        "Assembled {} ({} entries, {} bytes)",
        summary.metadata.deb_file_name(),
        entries,
        deb.len()
    );

    write_output(destination.as_deref(), &deb)?;
    if let Some(path) = destination {
        let shown = std::env::current_dir()
            .ok()
            .and_then(|cwd| pathdiff::diff_paths(&path, cwd))
            .filter(|rel| !rel.starts_with(".."))
            .unwrap_or(path);
        println!(
            "Wrote {} {} ({} files, Installed-Size {} KiB) to {}",
            summary.metadata.name,
            summary.metadata.version,
            summary.regular_files,
            summary.metadata.installed_size_kib,
            shown.display()
        );
    }
    Ok(summary)
}
