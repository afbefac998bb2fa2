//! Attribute edits on matched elements

use crate::errors::{PatchError, Result};
use crate::query::Query;
use crate::result::PatchResult;
use crate::xml::Document;

/// Set `attribute` only on matches that lack it
///
/// Every match counts as affected, including ones that already carried the
/// attribute.
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn attribute_add(doc: &mut Document, query: &Query, attribute: &str, value: &str) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        if doc.attribute(element, attribute).is_none() {
            doc.set_attribute(element, attribute, value);
        }
    }
    Ok(PatchResult::Counted {
        operation: "PatchOperationAttributeAdd",
        nodes_affected: found.len(),
    })
}

/// Set `attribute` on every match, overwriting existing values
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn attribute_set(doc: &mut Document, query: &Query, attribute: &str, value: &str) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        doc.set_attribute(element, attribute, value);
    }
    Ok(PatchResult::Counted {
        operation: "PatchOperationAttributeSet",
        nodes_affected: found.len(),
    })
}

/// Remove `attribute` from every match
///
/// If any match lacks the attribute nothing is removed and the result is
/// `Failed` with `MissingAttribute`.
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn attribute_remove(doc: &mut Document, query: &Query, attribute: &str) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    if found.iter().any(|&element| doc.attribute(element, attribute).is_none()) {
        return Ok(PatchResult::Failed {
            operation: "PatchOperationAttributeRemove",
            error: PatchError::MissingAttribute {
                query: query.to_string(),
                attribute: attribute.to_string(),
            },
        });
    }
    for &element in &found {
        doc.remove_attribute(element, attribute);
    }
    Ok(PatchResult::Counted {
        operation: "PatchOperationAttributeRemove",
        nodes_affected: found.len(),
    })
}
