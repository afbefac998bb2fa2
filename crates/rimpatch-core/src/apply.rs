//! Applying parsed operations to a working document
//!
//! [`apply`] evaluates one operation: gating first, then the variant's
//! effect, then the success policy. Structural errors abort with `Err`;
//! everything else is reported through the returned [`PatchResult`].

use crate::context::ActiveContext;
use crate::errors::{ExError, Result};
use crate::operation::{Operation, OperationKind};
use crate::ops::control_ops;
use crate::ops::node_ops::{self, SafeAddOptions};
use crate::ops::attribute_ops;
use crate::parse::OperationParser;
use crate::policy::SuccessPolicy;
use crate::result::PatchResult;
use crate::xml::{Document, XmlNode};
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a single operation
///
/// # Errors
///
/// Returns the structural error (`QueryShape`, `MissingParent`) raised by
/// the operation or any nested child. The document may be partially
/// modified when this happens.
pub fn apply(doc: &mut Document, operation: &Operation, ctx: &ActiveContext) -> Result<PatchResult> {
    if let Some(reason) = operation.meta.denial(ctx) {
        tracing::debug!(op = %operation.describe(), %reason, "operation denied");
        return Ok(PatchResult::Denied { reason });
    }

    let raw = apply_kind(doc, &operation.kind, ctx)?;

    Ok(match operation.meta.success {
        SuccessPolicy::Normal => raw,
        SuccessPolicy::Always if raw.is_successful() => raw,
        SuccessPolicy::Always => PatchResult::Suppressed(Box::new(raw)),
        SuccessPolicy::Invert => PatchResult::Inverted(Box::new(raw)),
        // Unreachable: denial() already reports Never
        SuccessPolicy::Never => raw,
    })
}

fn apply_kind(doc: &mut Document, kind: &OperationKind, ctx: &ActiveContext) -> Result<PatchResult> {
    match kind {
        OperationKind::Add { query, value, order } => node_ops::add(doc, query, value, *order),
        OperationKind::Insert {
            query,
            fragments,
            order,
        } => node_ops::insert(doc, query, fragments, *order),
        OperationKind::Remove { query } => node_ops::remove(doc, query),
        OperationKind::Replace { query, fragments } => node_ops::replace(doc, query, fragments),
        OperationKind::AttributeAdd {
            query,
            attribute,
            value,
        } => attribute_ops::attribute_add(doc, query, attribute, value),
        OperationKind::AttributeSet {
            query,
            attribute,
            value,
        } => attribute_ops::attribute_set(doc, query, attribute, value),
        OperationKind::AttributeRemove { query, attribute } => {
            attribute_ops::attribute_remove(doc, query, attribute)
        }
        OperationKind::AddExtension { query, fragments } => {
            node_ops::add_extension(doc, query, fragments)
        }
        OperationKind::Rename { query, name } => node_ops::rename(doc, query, name),
        OperationKind::Sequence { operations } => control_ops::sequence(doc, operations, ctx),
        OperationKind::Conditional {
            query,
            on_match,
            on_nomatch,
        } => control_ops::conditional(
            doc,
            query,
            on_match.as_deref(),
            on_nomatch.as_deref(),
            ctx,
        ),
        OperationKind::UnitPresence {
            units,
            on_match,
            on_nomatch,
        } => control_ops::unit_presence(
            doc,
            units,
            on_match.as_deref(),
            on_nomatch.as_deref(),
            ctx,
        ),
        OperationKind::Test { query } => control_ops::test(doc, query),
        OperationKind::SafeAdd {
            query,
            fragments,
            safety_depth,
            compare,
            check_attributes,
        } => node_ops::safe_add(
            doc,
            query,
            fragments,
            SafeAddOptions {
                safety_depth: *safety_depth,
                compare: *compare,
                check_attributes: *check_attributes,
            },
        ),
    }
}

/// Apply operations in order, collecting one result per operation
///
/// Unsuccessful results do not stop later operations.
///
/// # Errors
///
/// Stops at the first structural error.
pub fn execute(doc: &mut Document, operations: &[Operation], ctx: &ActiveContext) -> Result<Vec<PatchResult>> {
    let mut results = Vec::with_capacity(operations.len());
    for operation in operations {
        let result = apply(doc, operation, ctx)?;
        if !result.is_successful() {
            tracing::debug!(
                op = %operation.describe(),
                kind = result.label(),
                "operation unsuccessful"
            );
        }
        results.push(result);
    }
    Ok(results)
}

/// Parse a patch file and apply its operations to `doc`
///
/// # Errors
///
/// Returns parse errors before anything is applied, or the first structural
/// error during application.
pub fn patch(
    doc: &mut Document,
    file: &XmlNode,
    parser: &OperationParser,
    ctx: &ActiveContext,
) -> std::result::Result<Vec<PatchResult>, ExError> {
    log_op_start!("patch", root = file.name().unwrap_or_default());
    let start = std::time::Instant::now();

    let results = parser
        .parse_file(file)
        .and_then(|operations| execute(doc, &operations, ctx))
        .map_err(|e| {
            let ex: ExError = e.into();
            log_op_error!("patch", ex.clone(), duration_ms = start.elapsed().as_millis() as u64);
            ex
        })?;

    log_op_end!(
        "patch",
        duration_ms = start.elapsed().as_millis() as u64,
        ops_len = results.len(),
        successful = results.iter().filter(|r| r.is_successful()).count()
    );
    Ok(results)
}
