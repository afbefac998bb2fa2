//! Derived success, counts and errors of composite results

mod common;

use common::run;
use rimpatch_core::{ActiveContext, PatchError, PatchResult};

#[test]
fn test_sequence_aggregates_every_child_error() {
    // GIVEN two suppressed failures inside one sequence
    let (_, results) = run(
        "<Defs><T/></Defs>",
        r#"<Patch><Operation Class="PatchOperationSequence"><operations>
            <li Class="PatchOperationAttributeRemove"><xpath>/Defs/T</xpath><attribute>A</attribute><success>Always</success></li>
            <li Class="PatchOperationAttributeRemove"><xpath>/Defs/T</xpath><attribute>B</attribute><success>Always</success></li>
        </operations></Operation></Patch>"#,
        &ActiveContext::empty(),
    );

    // THEN the sequence succeeds but reports both errors
    assert!(results[0].is_successful());
    match results[0].error() {
        Some(PatchError::Multiple { errors }) => {
            assert_eq!(errors.len(), 2);
            assert!(errors
                .iter()
                .all(|e| matches!(e, PatchError::MissingAttribute { .. })));
        }
        other => panic!("expected aggregated errors, got {:?}", other),
    }
}

#[test]
fn test_single_child_error_is_not_wrapped() {
    let (_, results) = run(
        "<Defs><T/></Defs>",
        r#"<Patch><Operation Class="PatchOperationSequence"><operations>
            <li Class="PatchOperationAttributeRemove"><xpath>/Defs/T</xpath><attribute>A</attribute></li>
        </operations></Operation></Patch>"#,
        &ActiveContext::empty(),
    );
    assert!(matches!(
        results[0].error(),
        Some(PatchError::MissingAttribute { .. })
    ));
}

#[test]
fn test_wrappers_delegate_count() {
    let (_, results) = run(
        "<Defs><a/><a/></Defs>",
        r#"<Patch><Operation Class="PatchOperationConditional">
            <xpath>/Defs/a</xpath>
            <match Class="PatchOperationSetName"><xpath>/Defs/a</xpath><name>b</name><success>Invert</success></match>
        </Operation></Patch>"#,
        &ActiveContext::empty(),
    );
    let result = &results[0];
    assert_eq!(result.nodes_affected(), 2);
    assert!(!result.is_successful());

    let labels: Vec<_> = result.children().iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["inverted"]);
}

#[test]
fn test_summary_reflects_derived_fields() {
    let (_, results) = run(
        "<Defs/>",
        r#"<Patch><Operation Class="PatchOperationRemove"><xpath>/Defs/x</xpath><success>Always</success></Operation></Patch>"#,
        &ActiveContext::empty(),
    );
    let summary = results[0].summary();
    assert_eq!(summary.kind, "suppressed");
    assert!(summary.success);
    assert_eq!(summary.nodes_affected, 0);
    assert!(summary.error.is_none());
    assert!(matches!(results[0], PatchResult::Suppressed(_)));
}
