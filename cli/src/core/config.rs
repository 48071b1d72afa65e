//! # Debpack Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for the `debpack` CLI: it loads
//! defaults for package metadata and build options from TOML files, merges them,
//! expands paths, and validates the result. The library core never reads
//! configuration; commands resolve the effective values and pass plain values down.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags (applied by the command handlers)
//! 2. Project-specific `.debpack.toml` in the current directory or an ancestor
//!    (the search stops at a directory containing `.git`)
//! 3. User-specific `config.toml` in the platform config directory, or the file
//!    named by the `DEBPACK_CONFIG` environment variable
//! 4. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! [package]
//! maintainer = "Build Bot <builds@example.org>"
//! architecture = "amd64"
//!
//! [build]
//! owner = "root"
//! group = "root"
//! mtime = "2024-01-01T00:00:00Z"
//! output_dir = "~/debs"
//! ```
//!
use crate::core::error::{DebpackError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit user configuration file.
pub const CONFIG_ENV_VAR: &str = "DEBPACK_CONFIG";

const PROJECT_CONFIG_FILENAME: &str = ".debpack.toml";

pub const DEFAULT_ARCHITECTURE: &str = "all";
pub const DEFAULT_MAINTAINER: &str = "unknown";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub package: PackageDefaults,
    #[serde(default)]
    pub build: BuildDefaults,
}

/// Default control field values used when the corresponding flag is omitted.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageDefaults {
    pub architecture: Option<String>,
    pub maintainer: Option<String>,
    pub description: Option<String>,
}

/// Defaults applied while collecting file entries and writing the package.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildDefaults {
    /// Owner name stamped on every entry.
    pub owner: Option<String>,
    /// Group name stamped on every entry.
    pub group: Option<String>,
    /// Fixed modification time (epoch seconds or RFC 3339) for reproducible output.
    pub mtime: Option<String>,
    /// Directory receiving `<name>_<version>_<arch>.deb` when no output file is given.
    pub output_dir: Option<String>,
}

impl Config {
    pub fn architecture(&self) -> &str {
        self.package
            .architecture
            .as_deref()
            .unwrap_or(DEFAULT_ARCHITECTURE)
    }

    pub fn maintainer(&self) -> &str {
        self.package
            .maintainer
            .as_deref()
            .unwrap_or(DEFAULT_MAINTAINER)
    }

    pub fn description(&self) -> &str {
        self.package.description.as_deref().unwrap_or("")
    }

    /// The configured mtime override, parsed.
    pub fn mtime(&self) -> Result<Option<u64>> {
        self.build.mtime.as_deref().map(parse_mtime).transpose()
    }
}

/// # Load Configuration (`load_config`)
///
/// Loads, merges, expands and validates configuration from the user and project
/// configuration files. Missing files are not an error.
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        let config_path = PathBuf::from(shellexpand::tilde(&explicit).into_owned());
        info!(
            "Loading user configuration from ${}: {}",
            CONFIG_ENV_VAR,
            config_path.display()
        );
        return load_config_from_path(&config_path).map(Some);
    }
    if let Some(proj_dirs) = ProjectDirs::from("org", "debpack", "debpack") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.debpack.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win field by field; unset project fields fall back to the user's.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    Config {
        package: PackageDefaults {
            architecture: project_cfg
                .package
                .architecture
                .or(user.package.architecture),
            maintainer: project_cfg.package.maintainer.or(user.package.maintainer),
            description: project_cfg.package.description.or(user.package.description),
        },
        build: BuildDefaults {
            owner: project_cfg.build.owner.or(user.build.owner),
            group: project_cfg.build.group.or(user.build.group),
            mtime: project_cfg.build.mtime.or(user.build.mtime),
            output_dir: project_cfg.build.output_dir.or(user.build.output_dir),
        },
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(dir) = config.build.output_dir.as_mut() {
        *dir = shellexpand::tilde(dir.as_str()).into_owned();
        debug!("Expanded output directory: {}", dir);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if let Some(arch) = &config.package.architecture {
        if arch.is_empty() || arch.contains(char::is_whitespace) {
            return Err(anyhow!(DebpackError::Config(format!(
                "Invalid architecture '{}': must be non-empty and contain no whitespace.",
                arch
            ))));
        }
    }
    if let Some(mtime) = &config.build.mtime {
        parse_mtime(mtime)
            .map_err(|e| anyhow!(DebpackError::Config(format!("Invalid build.mtime: {}", e))))?;
    }
    if let Some(dir) = &config.build.output_dir {
        let out_dir = Path::new(dir);
        if !out_dir.exists() {
            warn!(
                "Configured output directory '{}' does not exist; it will be created.",
                out_dir.display()
            );
        } else if !out_dir.is_dir() {
            return Err(anyhow!(DebpackError::Config(format!(
                "Configured output path '{}' exists but is not a directory.",
                out_dir.display()
            ))));
        }
    }
    Ok(())
}

/// # Parse Modification Time (`parse_mtime`)
///
/// Accepts either integer seconds since the Unix epoch (`1700000000`) or an
/// RFC 3339 timestamp (`2024-01-01T00:00:00Z`). Times before the epoch are rejected.
pub fn parse_mtime(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(secs);
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(trimmed).map_err(|e| {
        anyhow!(DebpackError::ArgumentParsing(format!(
            "'{}' is neither epoch seconds nor an RFC 3339 timestamp ({})",
            value, e
        )))
    })?;
    u64::try_from(parsed.timestamp()).map_err(|_| {
        anyhow!(DebpackError::ArgumentParsing(format!(
            "'{}' is before the Unix epoch",
            value
        )))
    })
}
