//! # Handler for `debpack from-tar`
//!
//! File: cli/src/commands/from_tar.rs
//!
//! Converts a tar stream into a Debian package. The stream is read from a file
//! or from stdin and may be gzip-compressed; every member is placed below
//! `--prefix` in the package.
//!
//! ```bash
//! tar -C build -c . | debpack from-tar --name app --version 1.0 -f app.deb
//! debpack from-tar rootfs.tar.gz --name app --version 1.0 --prefix /opt/app
//! ```
//!
use crate::commands::{write_package, MetadataArgs, SourceArgs};
use crate::common::fs::io::open_input;
use crate::core::{config, error::Result};
use crate::deb::{entries_from_tar, package_from_entries};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Build a package from a tar stream (plain or gzip)")]
pub struct FromTarArgs {
    /// Tar file to read. Reads stdin when omitted or "-".
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub metadata: MetadataArgs,
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn handle_from_tar(args: FromTarArgs) -> Result<()> {
    info!("Handling from-tar command...");
    debug!("From-tar args: {:?}", args);

    let cfg = config::load_config().context("Failed to load debpack configuration")?;
    let metadata = args.metadata.resolve(&cfg)?;
    let opts = args.source.source_options(&cfg)?;

    let input = args
        .input
        .as_deref()
        .filter(|p| p.as_os_str() != "-");
    let reader = open_input(input)?;
    let entries = entries_from_tar(reader, &opts).with_context(|| match input {
        Some(p) => format!("Failed to convert tar input {:?}", p),
        None => "Failed to convert tar input from stdin".to_string(),
    })?;

    let package = package_from_entries(metadata, entries)?;
    write_package(package, args.source.file.as_deref(), &cfg)?;
    Ok(())
}
