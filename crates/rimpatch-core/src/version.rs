//! Dotted game version identifiers
//!
//! A version is a run of dot-separated integers (at least two components)
//! optionally followed by space-separated revision tags, e.g. `1.5.4104 rev435`.
//! A leading `v` is accepted and dropped. Ordering, equality and hashing use the
//! integer components only; tags are kept for display.

use crate::errors::{PatchError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    numbers: Vec<u32>,
    tags: Vec<String>,
}

impl Version {
    /// Build a version from its parts
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` if `numbers` is empty or a tag is not a
    /// non-empty run of ASCII alphanumerics and underscores.
    pub fn new(numbers: Vec<u32>, tags: Vec<String>) -> Result<Self> {
        if numbers.is_empty() || tags.iter().any(|t| !is_tag(t)) {
            return Err(PatchError::InvalidVersion {
                text: format_parts(&numbers, &tags),
            });
        }
        Ok(Self { numbers, tags })
    }

    /// Parse a version string
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` when the text is not a dotted version.
    pub fn parse(text: &str) -> Result<Self> {
        Self::sniff(text).ok_or_else(|| PatchError::InvalidVersion {
            text: text.to_string(),
        })
    }

    /// Tolerant variant of [`Version::parse`] for scanning candidate strings
    pub fn sniff(text: &str) -> Option<Self> {
        let text = text.strip_prefix('v').unwrap_or(text);
        let mut words = text.split(' ');
        let head = words.next()?;

        let numbers = head
            .split('.')
            .map(|part| {
                if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse::<u32>().ok()
                } else {
                    None
                }
            })
            .collect::<Option<Vec<u32>>>()?;
        if numbers.len() < 2 {
            return None;
        }

        let mut tags = Vec::new();
        for word in words {
            if !is_tag(word) {
                return None;
            }
            tags.push(word.to_string());
        }
        Some(Self { numbers, tags })
    }

    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Pick the candidate that best serves this version
    ///
    /// Returns an equal candidate if one exists, otherwise the greatest
    /// candidate strictly below `self`, otherwise `None`.
    pub fn nearest<'a, I>(&self, candidates: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        let mut best: Option<&'a Version> = None;
        for candidate in candidates {
            match candidate.cmp(self) {
                Ordering::Equal => return Some(candidate),
                Ordering::Less => {
                    if best.map_or(true, |b| candidate > b) {
                        best = Some(candidate);
                    }
                }
                Ordering::Greater => {}
            }
        }
        best
    }
}

/// Free-function form of [`Version::nearest`]
pub fn nearest<'a, I>(target: &Version, candidates: I) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    target.nearest(candidates)
}

fn is_tag(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn format_parts(numbers: &[u32], tags: &[String]) -> String {
    let mut out = numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".");
    for tag in tags {
        out.push(' ');
        out.push_str(tag);
    }
    out
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.numbers == other.numbers
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numbers.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    // Vec's lexicographic order already puts a strict prefix first
    fn cmp(&self, other: &Self) -> Ordering {
        self.numbers.cmp(&other.numbers)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_parts(&self.numbers, &self.tags))
    }
}

impl FromStr for Version {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = PatchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}
