//! # Package Metadata (`deb::metadata`)
//!
//! File: cli/src/deb/metadata.rs
//!
//! The control fields of a package. `installed_size_kib` is derived during
//! assembly and overwritten by `Package::serialize`; whatever the caller puts
//! there is ignored.
//!
use serde::{Deserialize, Serialize};

/// Meta information about the whole package.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub architecture: String,
    pub maintainer: String,
    pub description: String,
    #[serde(default)]
    pub installed_size_kib: u64,
}

impl PackageMetadata {
    /// Metadata with the three identifying fields set and everything else empty.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
            ..Default::default()
        }
    }

    pub fn with_maintainer(mut self, maintainer: impl Into<String>) -> Self {
        self.maintainer = maintainer.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Conventional file name, `<name>_<version>_<architecture>.deb`.
    pub fn deb_file_name(&self) -> String {
        format!("{}_{}_{}.deb", self.name, self.version, self.architecture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_file_name() {
        let meta = PackageMetadata::new("debsample", "0.0.1", "all")
            .with_maintainer("unknown")
            .with_description("example package");
        assert_eq!(meta.maintainer, "unknown");
        assert_eq!(meta.installed_size_kib, 0);
        assert_eq!(meta.deb_file_name(), "debsample_0.0.1_all.deb");
    }
}
