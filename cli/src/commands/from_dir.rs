//! # Handler for `debpack from-dir`
//!
//! File: cli/src/commands/from_dir.rs
//!
//! Packages a directory tree. The directory itself maps to `--prefix`; symlinks
//! are stored as links, never followed.
//!
use crate::commands::{write_package, MetadataArgs, SourceArgs};
use crate::core::{config, error::Result};
use crate::deb::{entries_from_dir, package_from_entries};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Build a package from a directory tree")]
pub struct FromDirArgs {
    /// Directory whose contents become the package payload.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
    #[command(flatten)]
    pub metadata: MetadataArgs,
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn handle_from_dir(args: FromDirArgs) -> Result<()> {
    info!("Handling from-dir command...");
    debug!("From-dir args: {:?}", args);

    let cfg = config::load_config().context("Failed to load debpack configuration")?;
    let metadata = args.metadata.resolve(&cfg)?;
    let opts = args.source.source_options(&cfg)?;

    let entries = entries_from_dir(&args.dir, &opts)
        .with_context(|| format!("Failed to collect files from {:?}", args.dir))?;
    let package = package_from_entries(metadata, entries)?;
    write_package(package, args.source.file.as_deref(), &cfg)?;
    Ok(())
}
