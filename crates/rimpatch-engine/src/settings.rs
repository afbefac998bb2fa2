//! Run configuration
//!
//! A run manifest is a TOML file naming the running version, the dispatcher
//! policy and the ordered unit directories:
//!
//! ```toml
//! version = "1.5"
//! skip_unknown_operations = true
//! units = ["Core", "mods/MyMod"]
//! ```
//!
//! Relative unit paths are resolved against the manifest's directory.

use crate::errors::{io_error, manifest_error, Result};
use rimpatch_core::{OperationParser, UnknownOperationPolicy, Version};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_TAG: &str = "Defs";

fn default_root_tag() -> String {
    DEFAULT_ROOT_TAG.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Running version used for folder selection
    pub version: Version,
    /// Drop operations with unknown classes instead of failing their file
    #[serde(default)]
    pub skip_unknown_operations: bool,
    /// Tag of the working document's root element
    #[serde(default = "default_root_tag")]
    pub root_tag: String,
}

impl RunSettings {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            skip_unknown_operations: false,
            root_tag: default_root_tag(),
        }
    }

    pub fn with_skip_unknown_operations(mut self, skip: bool) -> Self {
        self.skip_unknown_operations = skip;
        self
    }

    pub fn unknown_policy(&self) -> UnknownOperationPolicy {
        if self.skip_unknown_operations {
            UnknownOperationPolicy::Skip
        } else {
            UnknownOperationPolicy::Fail
        }
    }

    pub fn parser(&self) -> OperationParser {
        OperationParser::new(self.unknown_policy())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(flatten)]
    pub settings: RunSettings,
    /// Unit directories in run order
    #[serde(default)]
    pub units: Vec<PathBuf>,
}

impl RunManifest {
    /// Parse a manifest from TOML text
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifest` for malformed TOML, a missing or invalid
    /// version, or an empty root tag.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let manifest: RunManifest = toml::from_str(text).map_err(|e| manifest_error(&e.to_string()))?;
        if manifest.settings.root_tag.trim().is_empty() {
            return Err(manifest_error("root_tag must not be empty"));
        }
        Ok(manifest)
    }

    /// Load a manifest file, resolving unit paths against its directory
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`RunManifest::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_error("load_manifest", path, e))?;
        let mut manifest = Self::from_toml_str(&text).map_err(|e| e.with_file(path.display().to_string()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.units = manifest
            .units
            .into_iter()
            .map(|unit| if unit.is_absolute() { unit } else { base.join(unit) })
            .collect();
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_defaults() {
        let manifest = RunManifest::from_toml_str("version = \"1.5\"\n").unwrap();
        assert_eq!(manifest.settings.version, Version::parse("1.5").unwrap());
        assert_eq!(manifest.settings.root_tag, "Defs");
        assert!(!manifest.settings.skip_unknown_operations);
        assert!(manifest.units.is_empty());
        assert_eq!(manifest.settings.unknown_policy(), UnknownOperationPolicy::Fail);
    }

    #[test]
    fn test_manifest_full() {
        let manifest = RunManifest::from_toml_str(
            r#"
version = "1.4.3704 rev435"
skip_unknown_operations = true
root_tag = "Defs"
units = ["Core", "/abs/Mod"]
"#,
        )
        .unwrap();
        assert_eq!(manifest.settings.version.tags(), ["rev435".to_string()]);
        assert_eq!(manifest.settings.unknown_policy(), UnknownOperationPolicy::Skip);
        assert_eq!(manifest.units, vec![PathBuf::from("Core"), PathBuf::from("/abs/Mod")]);
    }

    #[test]
    fn test_manifest_rejects_bad_version() {
        let err = RunManifest::from_toml_str("version = \"latest\"\n").unwrap_err();
        assert_eq!(err.code(), "ERR_INVALID_MANIFEST");
    }

    #[test]
    fn test_manifest_requires_version() {
        assert!(RunManifest::from_toml_str("units = []\n").is_err());
    }
}
