//! Run-scoped set of active units

use std::collections::BTreeSet;

/// Identifiers and display names of the units active in a run
///
/// Captured once when a run starts and never mutated afterwards. Identifiers
/// compare case-insensitively; display names compare exactly.
///
/// # Example
/// ```
/// use rimpatch_core::ActiveContext;
///
/// let ctx = ActiveContext::new(["Ludeon.RimWorld"], ["Core"]);
/// assert!(ctx.is_id_active("ludeon.rimworld"));
/// assert!(ctx.is_name_active("Core"));
/// assert!(!ctx.is_name_active("core"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveContext {
    ids: BTreeSet<String>,
    names: BTreeSet<String>,
}

impl ActiveContext {
    pub fn new<I, N>(ids: I, names: N) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|id| normalize_id(id.as_ref()))
                .collect(),
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_string())
                .collect(),
        }
    }

    /// Context with no active units
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_id_active(&self, id: &str) -> bool {
        self.ids.contains(&normalize_id(id))
    }

    pub fn is_name_active(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Active identifiers, lowercased and sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}
