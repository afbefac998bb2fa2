//! Collaborator traits for content-contributing units
//!
//! A unit is identified by a case-insensitive id and carries an ordered list
//! of content folders. Each folder may be scoped to one version and may
//! require other units to be active.

use crate::errors::Result;
use rimpatch_core::{ActiveContext, Version, XmlNode};

/// A parsed XML file and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: String,
    pub root: XmlNode,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, root: XmlNode) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }
}

/// One version-scoped folder of a unit
pub trait ContentFolder {
    /// Short label for logs and reports
    fn label(&self) -> String;

    /// Declared version, or `None` for the version-less fallback
    fn version(&self) -> Option<&Version>;

    /// Unit ids that must all be active for this folder to load
    fn required_units(&self) -> &[String] {
        &[]
    }

    /// Definition files in merge order
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed.
    fn definitions(&self) -> Result<Vec<SourceFile>>;

    /// Operation files in application order
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed.
    fn patches(&self) -> Result<Vec<SourceFile>>;
}

pub trait Unit {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn supported_versions(&self) -> &[Version];

    /// Folders in declaration order
    fn folders(&self) -> Vec<&dyn ContentFolder>;
}

/// Folders of `unit` that load for `version`
///
/// Folders whose required units are not all active are ignored. Among the
/// rest, the versioned folder chosen by [`Version::nearest`] wins; if there
/// is none, every version-less folder is used.
pub fn select_folders<'u>(
    unit: &'u dyn Unit,
    version: &Version,
    ctx: &ActiveContext,
) -> Vec<&'u dyn ContentFolder> {
    let eligible: Vec<&'u dyn ContentFolder> = unit
        .folders()
        .into_iter()
        .filter(|folder| folder.required_units().iter().all(|id| ctx.is_id_active(id)))
        .collect();

    let best = {
        let declared: Vec<&Version> = eligible.iter().filter_map(|f| f.version()).collect();
        version
            .nearest(declared.iter().copied())
            .and_then(|best| eligible.iter().position(|f| f.version() == Some(best)))
    };

    match best {
        Some(index) => vec![eligible[index]],
        None => eligible
            .into_iter()
            .filter(|folder| folder.version().is_none())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryFolder, MemoryUnit};

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn unit() -> MemoryUnit {
        MemoryUnit::new("Author.Mod", "Mod")
            .with_folder(MemoryFolder::new())
            .with_folder(MemoryFolder::versioned(v("1.4")))
            .with_folder(MemoryFolder::versioned(v("1.5")))
    }

    fn labels(folders: &[&dyn ContentFolder]) -> Vec<String> {
        folders.iter().map(|f| f.label()).collect()
    }

    #[test]
    fn test_exact_version_folder_wins() {
        let unit = unit();
        let selected = select_folders(&unit, &v("1.5"), &ActiveContext::empty());
        assert_eq!(labels(&selected), vec!["1.5"]);
    }

    #[test]
    fn test_nearest_lower_version_folder() {
        let unit = unit();
        let selected = select_folders(&unit, &v("1.4.3704"), &ActiveContext::empty());
        assert_eq!(labels(&selected), vec!["1.4"]);
    }

    #[test]
    fn test_falls_back_to_versionless_folder() {
        let unit = unit();
        let selected = select_folders(&unit, &v("1.3"), &ActiveContext::empty());
        assert_eq!(labels(&selected), vec!["(root)"]);
    }

    #[test]
    fn test_folders_requiring_inactive_units_are_ignored() {
        let unit = MemoryUnit::new("Author.Mod", "Mod")
            .with_folder(MemoryFolder::new())
            .with_folder(MemoryFolder::versioned(v("1.5")).with_required_units(["Ludeon.RimWorld.Biotech"]));

        let without = select_folders(&unit, &v("1.5"), &ActiveContext::empty());
        assert_eq!(labels(&without), vec!["(root)"]);

        let ctx = ActiveContext::new(["ludeon.rimworld.biotech"], ["Biotech"]);
        let with = select_folders(&unit, &v("1.5"), &ctx);
        assert_eq!(labels(&with), vec!["1.5"]);
    }
}
