//! # Debpack Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test crates in `cli/tests/`:
//! - locating the compiled `debpack` binary, in a sandbox that no user or
//!   project configuration can leak into;
//! - a minimal `ar` reader to split a `.deb` into its members;
//! - a tar.gz lister to inspect `control.tar.gz` and `data.tar.gz`.
//!

// Allow potentially unused code in this common module, as different test files might use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates an `assert_cmd::Command` for the compiled `debpack` binary.
pub fn debpack_cmd() -> Command {
    Command::cargo_bin("debpack").expect("Failed to find debpack binary for testing")
}

/// A temporary working directory with an empty user configuration and a `.git`
/// marker that stops the project configuration search.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create sandbox directory");
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
        fs::write(dir.path().join("user-config.toml"), "").expect("Failed to write user config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// `debpack` running inside the sandbox.
    pub fn cmd(&self) -> Command {
        let mut cmd = debpack_cmd();
        cmd.current_dir(self.path())
            .env("DEBPACK_CONFIG", self.join("user-config.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// Writes a project `.debpack.toml` into the sandbox.
    pub fn write_project_config(&self, toml: &str) {
        fs::write(self.join(".debpack.toml"), toml).expect("Failed to write project config");
    }
}

/// One member of an `ar` archive.
#[derive(Debug)]
pub struct ArMember {
    pub name: String,
    pub mode: u32,
    pub data: Vec<u8>,
}

/// Splits a `.deb` into its `ar` members, asserting the container framing.
pub fn read_ar(bytes: &[u8]) -> Vec<ArMember> {
    assert!(bytes.starts_with(b"!<arch>\n"), "missing ar global header");
    let mut members = Vec::new();
    let mut pos = 8;
    while pos < bytes.len() {
        let header = &bytes[pos..pos + 60];
        assert_eq!(&header[58..60], b"`\n", "bad member header terminator");
        let field = |start: usize, end: usize| {
            std::str::from_utf8(&header[start..end])
                .unwrap()
                .trim_end()
                .to_string()
        };
        let size: usize = field(48, 58).parse().unwrap();
        let mode = u32::from_str_radix(&field(40, 48), 8).unwrap();
        let start = pos + 60;
        members.push(ArMember {
            name: field(0, 16),
            mode,
            data: bytes[start..start + size].to_vec(),
        });
        pos = start + size;
        if size % 2 == 1 {
            assert_eq!(bytes[pos], b'\n', "missing pad byte");
            pos += 1;
        }
    }
    members
}

/// Returns the member named `name` from a `.deb`.
pub fn ar_member<'a>(members: &'a [ArMember], name: &str) -> &'a ArMember {
    members
        .iter()
        .find(|m| m.name == name)
        .unwrap_or_else(|| panic!("member {name} not found"))
}

/// One member of a tar.gz payload.
#[derive(Debug)]
pub struct TarMember {
    pub path: String,
    pub kind: tar::EntryType,
    pub size: u64,
    pub mode: u32,
    pub link: Option<String>,
    pub body: Vec<u8>,
    pub owner: String,
}

/// Lists a gzip-compressed tar stream. Directory paths lose their trailing `/`.
pub fn list_tar_gz(bytes: &[u8]) -> Vec<TarMember> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut members = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let header = entry.header().clone();
        let mut body = Vec::new();
        entry.read_to_end(&mut body).unwrap();
        members.push(TarMember {
            path: entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string(),
            kind: header.entry_type(),
            size: header.size().unwrap(),
            mode: header.mode().unwrap(),
            link: header
                .link_name()
                .unwrap()
                .map(|l| l.to_string_lossy().into_owned()),
            body,
            owner: header.username().unwrap().unwrap_or("").to_string(),
        });
    }
    members
}

/// Text of the member `name` of a tar.gz payload.
pub fn tar_gz_text(bytes: &[u8], name: &str) -> String {
    let member = list_tar_gz(bytes)
        .into_iter()
        .find(|m| m.path == name)
        .unwrap_or_else(|| panic!("{name} not found in payload"));
    String::from_utf8(member.body).unwrap()
}
