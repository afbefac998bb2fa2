//! Result algebra for applied operations
//!
//! Leaf results carry their own success flag, affected count and error.
//! Composite and wrapper results derive all three from their children.

use crate::errors::PatchError;
use crate::policy::DenialReason;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum PatchResult {
    /// A mutating operation; successful iff it touched at least one node
    Counted {
        operation: &'static str,
        nodes_affected: usize,
    },

    /// An operation that matched but could not complete its effect
    Failed {
        operation: &'static str,
        error: PatchError,
    },

    /// Outcome of a pure test
    Test { matched: bool },

    /// Every child result that was executed, in order
    Sequence { results: Vec<PatchResult> },

    /// Branch choice plus the result of the branch, if one existed
    Conditional {
        matched: bool,
        child: Option<Box<PatchResult>>,
    },

    /// `Always` policy applied to an unsuccessful result
    Suppressed(Box<PatchResult>),

    /// `Invert` policy applied to a result
    Inverted(Box<PatchResult>),

    /// Gating refused the operation or its policy is `Never`
    Denied { reason: DenialReason },
}

impl PatchResult {
    pub fn is_successful(&self) -> bool {
        match self {
            PatchResult::Counted { nodes_affected, .. } => *nodes_affected > 0,
            PatchResult::Failed { .. } => false,
            PatchResult::Test { matched } => *matched,
            PatchResult::Sequence { results } => {
                !results.is_empty() && results.iter().all(PatchResult::is_successful)
            }
            PatchResult::Conditional { child, .. } => {
                child.as_ref().is_some_and(|c| c.is_successful())
            }
            PatchResult::Suppressed(_) => true,
            PatchResult::Inverted(inner) => !inner.is_successful(),
            PatchResult::Denied { .. } => false,
        }
    }

    pub fn nodes_affected(&self) -> usize {
        match self {
            PatchResult::Counted { nodes_affected, .. } => *nodes_affected,
            PatchResult::Failed { .. } | PatchResult::Test { .. } | PatchResult::Denied { .. } => 0,
            PatchResult::Sequence { results } => results.iter().map(PatchResult::nodes_affected).sum(),
            PatchResult::Conditional { child, .. } => {
                child.as_ref().map_or(0, |c| c.nodes_affected())
            }
            PatchResult::Suppressed(inner) | PatchResult::Inverted(inner) => inner.nodes_affected(),
        }
    }

    /// The error carried by this result, if any
    ///
    /// A sequence reports every child error: a single one as-is, several
    /// wrapped in `PatchError::Multiple`.
    pub fn error(&self) -> Option<PatchError> {
        match self {
            PatchResult::Failed { error, .. } => Some(error.clone()),
            PatchResult::Counted { .. } | PatchResult::Test { .. } | PatchResult::Denied { .. } => {
                None
            }
            PatchResult::Sequence { results } => {
                let mut errors: Vec<PatchError> =
                    results.iter().filter_map(PatchResult::error).collect();
                match errors.len() {
                    0 => None,
                    1 => errors.pop(),
                    _ => Some(PatchError::Multiple { errors }),
                }
            }
            PatchResult::Conditional { child, .. } => child.as_ref().and_then(|c| c.error()),
            PatchResult::Suppressed(inner) | PatchResult::Inverted(inner) => inner.error(),
        }
    }

    /// Direct children, for walking how an outcome was derived
    pub fn children(&self) -> Vec<&PatchResult> {
        match self {
            PatchResult::Sequence { results } => results.iter().collect(),
            PatchResult::Conditional { child, .. } => child.iter().map(|c| c.as_ref()).collect(),
            PatchResult::Suppressed(inner) | PatchResult::Inverted(inner) => vec![inner.as_ref()],
            _ => Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PatchResult::Counted { .. } => "counted",
            PatchResult::Failed { .. } => "failed",
            PatchResult::Test { .. } => "test",
            PatchResult::Sequence { .. } => "sequence",
            PatchResult::Conditional { .. } => "conditional",
            PatchResult::Suppressed(_) => "suppressed",
            PatchResult::Inverted(_) => "inverted",
            PatchResult::Denied { .. } => "denied",
        }
    }

    /// Flattened view for reports and logs
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            kind: self.label(),
            success: self.is_successful(),
            nodes_affected: self.nodes_affected(),
            error: self.error().map(|e| e.to_string()),
        }
    }
}

/// Serializable snapshot of a result's derived fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub kind: &'static str,
    pub success: bool,
    pub nodes_affected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counted(n: usize) -> PatchResult {
        PatchResult::Counted {
            operation: "PatchOperationAdd",
            nodes_affected: n,
        }
    }

    #[test]
    fn test_counted_success_follows_count() {
        assert!(counted(2).is_successful());
        assert!(!counted(0).is_successful());
    }

    #[test]
    fn test_empty_sequence_is_unsuccessful() {
        assert!(!PatchResult::Sequence { results: vec![] }.is_successful());
    }

    #[test]
    fn test_conditional_without_child() {
        let result = PatchResult::Conditional {
            matched: false,
            child: None,
        };
        assert!(!result.is_successful());
        assert_eq!(result.nodes_affected(), 0);
        assert!(result.error().is_none());
        assert!(result.children().is_empty());
    }

    #[test]
    fn test_summary_serializes_without_null_error() {
        let json = serde_json::to_string(&counted(1).summary()).unwrap();
        assert_eq!(json, r#"{"kind":"counted","success":true,"nodes_affected":1}"#);
    }
}
