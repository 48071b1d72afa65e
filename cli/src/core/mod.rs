//! # Debpack Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by the package assembler and
//! the command handlers.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging, and validation (CLI only)
//! - `error`: `DebpackError`, stage/operation tags and result aliases
//! - `templating`: Rendering of the `control` record
//!
//! ```rust
//! use debpack::core::error::{BuildResult, DebpackError};
//! use debpack::core::templating::render_control;
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;
