#![allow(clippy::unwrap_used, clippy::expect_used)]

use rimpatch_core::errors::PatchError;
use rimpatch_core::logging_facility::init_test_capture;
use rimpatch_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use rimpatch_core::{
    log_op_end, log_op_error, log_op_start, patch, ActiveContext, Document, OperationParser,
    XmlNode,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, file = "Patches/a.xml");

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event(), Some(EVENT_START));
    assert_eq!(events[0].field("file"), Some("Patches/a.xml"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = PatchError::MissingParent {
        query: "/Defs".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one error event");
    assert_eq!(events[0].event(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field("err.code"), Some("ERR_MISSING_PARENT"));
}

#[test]
fn test_patch_logs_one_start_and_one_end() {
    let capture = init_test_capture();
    let mut doc = Document::new("Defs");
    let file = XmlNode::parse(
        r#"<Patch><Operation Class="PatchOperationAdd"><xpath>/Defs</xpath><value><unique_marker_4/></value></Operation></Patch>"#,
    )
    .unwrap();

    patch(&mut doc, &file, &OperationParser::default(), &ActiveContext::empty()).unwrap();

    let events = capture.events_for("patch");
    assert!(events.iter().any(|e| e.event() == Some(EVENT_START)));
    assert!(events
        .iter()
        .any(|e| e.event() == Some(EVENT_END) && e.field("ops_len") == Some("1")));
}

#[test]
fn test_patch_failure_logs_end_error() {
    let capture = init_test_capture();
    let mut doc = Document::new("Defs");
    let file = XmlNode::parse(
        r#"<Patch><Operation Class="PatchOperationRemove"><xpath>/Defs</xpath></Operation></Patch>"#,
    )
    .unwrap();

    let err = patch(&mut doc, &file, &OperationParser::default(), &ActiveContext::empty()).unwrap_err();
    assert_eq!(err.code(), "ERR_MISSING_PARENT");
    assert!(capture.count_events(|e| {
        e.is("patch", EVENT_END_ERROR) && e.field("err.code") == Some("ERR_MISSING_PARENT")
    }) >= 1);
}
