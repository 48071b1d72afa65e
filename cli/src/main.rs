//! # Debpack Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the `debpack` CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the subcommand handlers in `debpack::commands`
//!
//! Logs always go to stderr: stdout may carry the package itself.
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! debpack --help
//!
//! # Write the sample package with debug logging
//! debpack -vv sample -f debsample.deb
//!
//! # Package a tarball
//! debpack from-tar rootfs.tar.gz --name app --version 1.0 > app.deb
//! ```
//!
use clap::{Parser, Subcommand};
use debpack::commands;
use tracing_subscriber::{fmt, EnvFilter};

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "debpack",
    about = "Build Debian binary packages (.deb) without dpkg",
    long_about = "Assembles .deb packages in memory from tar streams, directory trees,\n\
                  or the built-in sample, and writes them to a file or stdout.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

// Subcommands get no `--version` flag of their own: `--version` is the package
// version there.
#[derive(Subcommand, Debug)]
enum Commands {
    FromTar(commands::from_tar::FromTarArgs),
    FromDir(commands::from_dir::FromDirArgs),
    Sample(commands::sample::SampleArgs),
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::FromTar(args) => commands::from_tar::handle_from_tar(args),
        Commands::FromDir(args) => commands::from_dir::handle_from_dir(args),
        Commands::Sample(args) => commands::sample::handle_sample(args),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["debpack", "sample", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Sample(_)));
    }
}
