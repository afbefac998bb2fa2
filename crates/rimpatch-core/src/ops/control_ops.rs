//! Composite and non-mutating operations

use crate::apply::apply;
use crate::context::ActiveContext;
use crate::errors::Result;
use crate::operation::Operation;
use crate::query::Query;
use crate::result::PatchResult;
use crate::xml::Document;

/// Apply children in order, stopping after the first unsuccessful one
///
/// Children after the stopping point are neither applied nor recorded.
pub fn sequence(doc: &mut Document, operations: &[Operation], ctx: &ActiveContext) -> Result<PatchResult> {
    let mut results = Vec::with_capacity(operations.len());
    for operation in operations {
        let result = apply(doc, operation, ctx)?;
        let stop = !result.is_successful();
        results.push(result);
        if stop {
            break;
        }
    }
    Ok(PatchResult::Sequence { results })
}

/// Apply `on_match` if the query matches, otherwise `on_nomatch`
pub fn conditional(
    doc: &mut Document,
    query: &Query,
    on_match: Option<&Operation>,
    on_nomatch: Option<&Operation>,
    ctx: &ActiveContext,
) -> Result<PatchResult> {
    let matched = query.matches(doc)?;
    branch(doc, matched, on_match, on_nomatch, ctx)
}

/// Branch on whether every named unit is active
pub fn unit_presence(
    doc: &mut Document,
    units: &[String],
    on_match: Option<&Operation>,
    on_nomatch: Option<&Operation>,
    ctx: &ActiveContext,
) -> Result<PatchResult> {
    let matched = units.iter().all(|unit| ctx.is_name_active(unit));
    branch(doc, matched, on_match, on_nomatch, ctx)
}

fn branch(
    doc: &mut Document,
    matched: bool,
    on_match: Option<&Operation>,
    on_nomatch: Option<&Operation>,
    ctx: &ActiveContext,
) -> Result<PatchResult> {
    let chosen = if matched { on_match } else { on_nomatch };
    let child = match chosen {
        Some(operation) => Some(Box::new(apply(doc, operation, ctx)?)),
        None => None,
    };
    Ok(PatchResult::Conditional { matched, child })
}

pub fn test(doc: &Document, query: &Query) -> Result<PatchResult> {
    Ok(PatchResult::Test {
        matched: query.matches(doc)?,
    })
}
