//! In-memory units for harnesses and tests

use crate::errors::Result;
use crate::unit::{ContentFolder, SourceFile, Unit};
use rimpatch_core::{Version, XmlNode};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryFolder {
    version: Option<Version>,
    required: Vec<String>,
    definitions: Vec<SourceFile>,
    patches: Vec<SourceFile>,
}

impl MemoryFolder {
    /// Version-less folder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn versioned(version: Version) -> Self {
        Self {
            version: Some(version),
            ..Self::default()
        }
    }

    pub fn with_required_units<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_definition(mut self, path: impl Into<String>, root: XmlNode) -> Self {
        self.definitions.push(SourceFile::new(path, root));
        self
    }

    pub fn with_patch(mut self, path: impl Into<String>, root: XmlNode) -> Self {
        self.patches.push(SourceFile::new(path, root));
        self
    }
}

impl ContentFolder for MemoryFolder {
    fn label(&self) -> String {
        match &self.version {
            Some(version) => version.to_string(),
            None => "(root)".to_string(),
        }
    }

    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    fn required_units(&self) -> &[String] {
        &self.required
    }

    fn definitions(&self) -> Result<Vec<SourceFile>> {
        Ok(self.definitions.clone())
    }

    fn patches(&self) -> Result<Vec<SourceFile>> {
        Ok(self.patches.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryUnit {
    id: String,
    name: String,
    supported_versions: Vec<Version>,
    folders: Vec<MemoryFolder>,
}

impl MemoryUnit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supported_versions: Vec::new(),
            folders: Vec::new(),
        }
    }

    pub fn with_supported_version(mut self, version: Version) -> Self {
        self.supported_versions.push(version);
        self
    }

    pub fn with_folder(mut self, folder: MemoryFolder) -> Self {
        self.folders.push(folder);
        self
    }
}

impl Unit for MemoryUnit {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn supported_versions(&self) -> &[Version] {
        &self.supported_versions
    }

    fn folders(&self) -> Vec<&dyn ContentFolder> {
        self.folders.iter().map(|f| f as &dyn ContentFolder).collect()
    }
}
