//! # Debpack Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout debpack. Package assembly
//! is all-or-nothing: the first failure aborts the build, and the error carries
//! enough context to say *where* it happened without the caller having to know
//! anything about the archive internals.
//!
//! ## Architecture
//!
//! The error system consists of three parts:
//! - `DebpackError`: A `thiserror` enum covering every failure category.
//! - `Stage` / `Operation`: Tags recording which payload (data, control, outer
//!   container) and which step (header, content, close) failed.
//! - Two result aliases: `BuildResult<T>` for the library core, which callers can
//!   match on, and `Result<T>` (`anyhow::Result<T>`) for the application layer.
//!
//! ## Examples
//!
//! ```rust
//! use debpack::core::error::{DebpackError, Stage};
//!
//! # fn handle(result: Result<(), DebpackError>) {
//! match result {
//!     Ok(()) => {}
//!     Err(e) if e.stage() == Some(Stage::DataPayload) => eprintln!("data payload: {}", e),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # }
//! ```
//!
use std::fmt;
use thiserror::Error;

/// The part of the package a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The `data.tar.gz` payload holding the installed files.
    DataPayload,
    /// The `control.tar.gz` payload holding `control` and `md5sums`.
    ControlPayload,
    /// The outer `ar` container.
    Container,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::DataPayload => write!(f, "data payload"),
            Stage::ControlPayload => write!(f, "control payload"),
            Stage::Container => write!(f, "outer container"),
        }
    }
}

/// The write step that failed within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Header,
    Content,
    Close,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Header => write!(f, "header"),
            Operation::Content => write!(f, "content"),
            Operation::Close => write!(f, "close"),
        }
    }
}

/// Custom error type for debpack.
// No PartialEq: io::Error and tera::Error don't implement it.
#[derive(Error, Debug)]
pub enum DebpackError {
    #[error("Failed to write {operation} of '{entry}' in {stage}: {source}")]
    Write {
        stage: Stage,
        operation: Operation,
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid container member '{name}': {reason}")]
    InvalidMember { name: String, reason: String },

    #[error("Invalid control field '{field}': {reason}")]
    ControlField { field: &'static str, reason: String },

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

impl DebpackError {
    /// Shorthand for a `Write` error.
    pub fn write(
        stage: Stage,
        operation: Operation,
        entry: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        DebpackError::Write {
            stage,
            operation,
            entry: entry.into(),
            source,
        }
    }

    /// Shorthand for an `InvalidPath` error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DebpackError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The package stage this error is attributed to, if any.
    ///
    /// Rendering failures belong to the control payload; configuration and
    /// argument errors happen before assembly starts and have no stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DebpackError::Write { stage, .. } => Some(*stage),
            DebpackError::InvalidMember { .. } => Some(Stage::Container),
            DebpackError::ControlField { .. } | DebpackError::Template { .. } => {
                Some(Stage::ControlPayload)
            }
            _ => None,
        }
    }
}

/// Result type of the library core; the error is always a `DebpackError`.
pub type BuildResult<T> = std::result::Result<T, DebpackError>;

/// Type alias for Result using anyhow::Error, used by the command layer where
/// context strings matter more than matching on variants.
pub type Result<T> = anyhow::Result<T>;
