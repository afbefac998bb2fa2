use rimpatch_core::{
    execute, ActiveContext, Document, Operation, OperationParser, PatchResult, XmlNode,
};

/// Build a working document from XML text
#[allow(dead_code)]
pub fn doc(xml: &str) -> Document {
    Document::from_node(&XmlNode::parse(xml).unwrap())
}

/// Parse a single `<Operation>` element with the default parser
#[allow(dead_code)]
pub fn op(xml: &str) -> Operation {
    OperationParser::default()
        .parse_operation(&XmlNode::parse(xml).unwrap())
        .unwrap()
        .expect("operation should not be skipped")
}

/// Parse every operation in a `<Patch>` file
#[allow(dead_code)]
pub fn ops(xml: &str) -> Vec<Operation> {
    OperationParser::default()
        .parse_file(&XmlNode::parse(xml).unwrap())
        .unwrap()
}

/// Apply a patch file to a fresh document and return both
#[allow(dead_code)]
pub fn run(defs: &str, patch: &str, ctx: &ActiveContext) -> (Document, Vec<PatchResult>) {
    let mut document = doc(defs);
    let results = execute(&mut document, &ops(patch), ctx).unwrap();
    (document, results)
}

/// Compact serialization of the whole document
#[allow(dead_code)]
pub fn compact(document: &Document) -> String {
    document.to_xml().to_compact_string()
}

/// Context with the given unit ids, using each id as its display name too
#[allow(dead_code)]
pub fn ctx(units: &[&str]) -> ActiveContext {
    ActiveContext::new(units.iter().copied(), units.iter().copied())
}
