//! Gating preconditions and success policies
//!
//! Every operation carries an [`OperationMeta`]: optional requires-all and
//! requires-any unit lists plus a [`SuccessPolicy`]. Gating is checked before
//! the policy is consulted, so a denied operation never reaches `Always` or
//! `Invert` handling.

use crate::context::ActiveContext;
use crate::errors::{PatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an operation's real outcome is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuccessPolicy {
    /// Pass the real result through
    #[default]
    Normal,
    /// Report success even when the real result failed
    Always,
    /// Report the negation of the real result
    Invert,
    /// Do not apply; report denial
    Never,
}

impl SuccessPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessPolicy::Normal => "Normal",
            SuccessPolicy::Always => "Always",
            SuccessPolicy::Invert => "Invert",
            SuccessPolicy::Never => "Never",
        }
    }
}

impl FromStr for SuccessPolicy {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Normal" => Ok(SuccessPolicy::Normal),
            "Always" => Ok(SuccessPolicy::Always),
            "Invert" => Ok(SuccessPolicy::Invert),
            "Never" => Ok(SuccessPolicy::Never),
            other => Err(PatchError::malformed(format!(
                "incorrect success value: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SuccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the dispatcher does with an unrecognized `Class`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownOperationPolicy {
    /// Raise `UnknownOperation`
    #[default]
    Fail,
    /// Drop the operation; it produces no result
    Skip,
}

/// Why an operation was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// A requires-all unit is inactive
    MissingRequired { unit: String },
    /// None of the requires-any units is active
    NoneOfAny { units: Vec<String> },
    /// The success policy is `Never`
    NeverPolicy,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::MissingRequired { unit } => write!(f, "required unit {} is not active", unit),
            DenialReason::NoneOfAny { units } => {
                write!(f, "none of [{}] is active", units.join(", "))
            }
            DenialReason::NeverPolicy => f.write_str("success policy is Never"),
        }
    }
}

/// Gating and success policy shared by every operation variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMeta {
    pub requires_all: Vec<String>,
    pub requires_any: Vec<String>,
    pub success: SuccessPolicy,
}

impl OperationMeta {
    /// Check the preconditions and the `Never` policy
    ///
    /// Returns `Some(reason)` when the operation must not run.
    pub fn denial(&self, ctx: &ActiveContext) -> Option<DenialReason> {
        if let Some(missing) = self.requires_all.iter().find(|id| !ctx.is_id_active(id)) {
            return Some(DenialReason::MissingRequired {
                unit: missing.clone(),
            });
        }
        if !self.requires_any.is_empty() && !self.requires_any.iter().any(|id| ctx.is_id_active(id)) {
            return Some(DenialReason::NoneOfAny {
                units: self.requires_any.clone(),
            });
        }
        if self.success == SuccessPolicy::Never {
            return Some(DenialReason::NeverPolicy);
        }
        None
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Split a comma-separated unit list, trimming and dropping empty entries
pub fn split_unit_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_policy_parse() {
        assert_eq!("Invert".parse::<SuccessPolicy>().unwrap(), SuccessPolicy::Invert);
        let err = "invert".parse::<SuccessPolicy>().unwrap_err();
        assert!(matches!(err, PatchError::MalformedPatch { .. }));
    }

    #[test]
    fn test_gating_is_checked_before_policy() {
        let meta = OperationMeta {
            requires_all: vec!["a.b".into()],
            requires_any: vec![],
            success: SuccessPolicy::Never,
        };
        assert_eq!(
            meta.denial(&ActiveContext::empty()),
            Some(DenialReason::MissingRequired { unit: "a.b".into() })
        );
    }

    #[test]
    fn test_requires_any() {
        let meta = OperationMeta {
            requires_any: vec!["x.y".into(), "a.b".into()],
            ..Default::default()
        };
        let ctx = ActiveContext::new(["A.B"], Vec::<String>::new());
        assert_eq!(meta.denial(&ctx), None);
        assert!(meta.denial(&ActiveContext::empty()).is_some());
    }

    #[test]
    fn test_split_unit_list() {
        assert_eq!(split_unit_list(" a.b , c.d,,"), vec!["a.b", "c.d"]);
    }
}
