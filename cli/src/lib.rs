//! # debpack
//!
//! Assembles Debian binary packages (`.deb`) entirely in memory.
//!
//! - [`deb`]: package model and assembler.
//! - [`common`]: archive writers (`tar`+gzip payloads, `ar` container) and I/O helpers.
//! - [`core`]: errors, configuration, control record rendering.
//! - [`commands`]: the subcommands of the `debpack` binary.
//!
pub mod commands;
pub mod common;
pub mod core;
pub mod deb;
