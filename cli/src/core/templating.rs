//! # Debpack Control Record Rendering
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! This module renders the `control` member of `control.tar.gz` from a
//! `PackageMetadata` record. Rendering is a pure function: the template is a
//! constant, the context is built from the metadata, and nothing is cached or
//! shared between packages.
//!
//! ## Architecture
//!
//! The control record uses the Tera templating engine:
//! 1. Every field value is checked for line breaks (a line break would start a
//!    new, unintended control field).
//! 2. A `tera::Context` is serialized from the metadata.
//! 3. `CONTROL_TEMPLATE` is rendered with autoescaping disabled.
//!
//! Fields are always emitted in the fixed order `Package`, `Version`,
//! `Architecture`, `Installed-Size`, `Maintainer`, `Description`, even when a value
//! is empty.
//!
//! ## Examples
//!
//! ```rust
//! use debpack::core::templating::render_control;
//! use debpack::deb::PackageMetadata;
//!
//! let meta = PackageMetadata::new("hello", "1.0", "all");
//! let text = render_control(&meta).unwrap();
//! assert!(text.starts_with("Package: hello\n"));
//! ```
//!
use crate::core::error::{BuildResult, DebpackError};
use crate::deb::PackageMetadata;
use tera::Tera;
use tracing::debug;

/// The control record template. Mandatory fields only.
pub const CONTROL_TEMPLATE: &str = "\
Package: {{ name }}
Version: {{ version }}
Architecture: {{ architecture }}
Installed-Size: {{ installed_size_kib }}
Maintainer: {{ maintainer }}
Description: {{ description }}
";

/// # Render Control Record (`render_control`)
///
/// Renders the six-field control record for `metadata`.
///
/// ## Returns
///
/// * `BuildResult<String>` - The newline-terminated control text.
///
/// ## Errors
///
/// * `DebpackError::ControlField` if any value contains `\n` or `\r`.
/// * `DebpackError::Template` if Tera fails to build the context or render.
pub fn render_control(metadata: &PackageMetadata) -> BuildResult<String> {
    validate_fields(metadata)?;

    let context = tera::Context::from_serialize(metadata)?;
    let mut rendered = Tera::one_off(CONTROL_TEMPLATE, &context, false)?;
    // Tera may drop the final newline of a template; the record must end with one.
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    debug!("Rendered control record for '{}'", metadata.name);
    Ok(rendered)
}

fn validate_fields(metadata: &PackageMetadata) -> BuildResult<()> {
    let fields: [(&'static str, &str); 5] = [
        ("Package", &metadata.name),
        ("Version", &metadata.version),
        ("Architecture", &metadata.architecture),
        ("Maintainer", &metadata.maintainer),
        ("Description", &metadata.description),
    ];
    for (field, value) in fields {
        if value.contains(['\n', '\r']) {
            return Err(DebpackError::ControlField {
                field,
                reason: "value must not contain line breaks".to_string(),
            });
        }
    }
    Ok(())
}
