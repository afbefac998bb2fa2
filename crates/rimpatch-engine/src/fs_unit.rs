//! Directory-backed units
//!
//! Layout:
//!
//! ```text
//! <unit>/About/About.xml     packageId, name, supportedVersions/li
//! <unit>/Defs/**/*.xml       version-less definitions
//! <unit>/Patches/**/*.xml    version-less operation files
//! <unit>/<version>/Defs/...  definitions for one version, e.g. 1.5/Defs
//! ```

use crate::errors::{in_file, io_error, unit_error, Result};
use crate::unit::{ContentFolder, SourceFile, Unit};
use rimpatch_core::{Version, XmlNode};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const ABOUT_FILE: &str = "About/About.xml";
const DEFS_DIR: &str = "Defs";
const PATCHES_DIR: &str = "Patches";

#[derive(Debug, Clone, PartialEq)]
pub struct DirFolder {
    path: PathBuf,
    version: Option<Version>,
}

impl DirFolder {
    pub fn new(path: impl Into<PathBuf>, version: Option<Version>) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentFolder for DirFolder {
    fn label(&self) -> String {
        match &self.version {
            Some(version) => version.to_string(),
            None => "(root)".to_string(),
        }
    }

    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    fn definitions(&self) -> Result<Vec<SourceFile>> {
        load_xml_files(&self.path.join(DEFS_DIR))
    }

    fn patches(&self) -> Result<Vec<SourceFile>> {
        load_xml_files(&self.path.join(PATCHES_DIR))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirUnit {
    path: PathBuf,
    id: String,
    name: String,
    supported_versions: Vec<Version>,
    folders: Vec<DirFolder>,
}

impl DirUnit {
    /// Load a unit from its directory
    ///
    /// The unit root is the version-less folder; every immediate
    /// sub-directory whose name parses as a version is a versioned folder.
    ///
    /// # Errors
    ///
    /// Returns an error if `About/About.xml` is missing, unreadable, or has
    /// no `packageId`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let about_path = path.join(ABOUT_FILE);
        let about = read_xml(&about_path)?;

        let id = about
            .child_text("packageId")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| unit_error(&about_path, "packageId is missing"))?;
        let name = about
            .child_text("name")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.clone());

        let mut supported_versions = Vec::new();
        if let Some(list) = about.child("supportedVersions") {
            for li in list.child_elements() {
                let text = li.text_content().unwrap_or_default();
                match Version::sniff(text.trim()) {
                    Some(version) => supported_versions.push(version),
                    None => tracing::warn!(
                        unit_id = %id,
                        value = %text,
                        "ignoring unparseable supported version"
                    ),
                }
            }
        }

        let mut folders = vec![DirFolder::new(&path, None)];
        let mut versioned = Vec::new();
        let entries = fs::read_dir(&path).map_err(|e| io_error("load_unit", &path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error("load_unit", &path, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(version) = entry.file_name().to_str().and_then(Version::sniff) {
                versioned.push(DirFolder::new(entry.path(), Some(version)));
            }
        }
        versioned.sort_by(|a, b| a.version.cmp(&b.version));
        folders.extend(versioned);

        Ok(Self {
            path,
            id,
            name,
            supported_versions,
            folders,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Unit for DirUnit {
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

/// Read and parse one XML file
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be read and an `XmlParse` error
/// carrying the path if it is not well-formed.
pub fn read_xml(path: &Path) -> Result<XmlNode> {
    let text = fs::read_to_string(path).map_err(|e| io_error("read_xml", path, e))?;
    XmlNode::parse(&text).map_err(|e| in_file(e, &path.display().to_string()))
}

/// Every `*.xml` file below `dir`, sorted by path
///
/// A missing directory yields no files.
fn load_xml_files(dir: &Path) -> Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            io_error("walk", &path, e.into())
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            files.push(SourceFile::new(path.display().to_string(), read_xml(path)?));
        }
    }
    Ok(files)
}
