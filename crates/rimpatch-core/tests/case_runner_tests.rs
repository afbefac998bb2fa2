//! Data-driven cases under `tests/cases`
//!
//! Each file holds `<Case>` elements with a `Name`, the starting `Defs`, a
//! `Patch`, optional active `Mods` and the `Expected` children of the root.

use rimpatch_core::{execute, ActiveContext, Document, OperationParser, XmlNode};
use std::path::PathBuf;

fn case_files() -> Vec<PathBuf> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/cases");
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();
    files
}

fn run_case(case: &XmlNode) -> Result<(), String> {
    let name = case.child_text("Name").unwrap_or_default();
    let units: Vec<String> = case
        .child("Mods")
        .map(|mods| mods.child_elements().filter_map(|li| li.text_content()).collect())
        .unwrap_or_default();
    let ctx = ActiveContext::new(&units, &units);

    let defs = case.child("Defs").ok_or(format!("{}: no Defs", name))?;
    let patch = case.child("Patch").ok_or(format!("{}: no Patch", name))?;
    let expected = case.child("Expected").ok_or(format!("{}: no Expected", name))?;

    let mut doc = Document::from_node(defs);
    let operations = OperationParser::default()
        .parse_file(patch)
        .map_err(|e| format!("{}: {}", name, e))?;
    execute(&mut doc, &operations, &ctx).map_err(|e| format!("{}: {}", name, e))?;

    let actual = doc.to_xml();
    if actual.children() != expected.children() {
        return Err(format!(
            "{}:\n  expected {}\n  actual   {}",
            name,
            expected
                .children()
                .iter()
                .fold(XmlNode::element("Defs"), |node, c| node.with_child(c.clone()))
                .to_compact_string(),
            actual.to_compact_string()
        ));
    }
    Ok(())
}

#[test]
fn test_all_cases() {
    let files = case_files();
    assert!(!files.is_empty(), "no case files found");

    let mut failures = Vec::new();
    let mut count = 0;
    for path in files {
        let text = std::fs::read_to_string(&path).unwrap();
        let root = XmlNode::parse(&text).unwrap();
        for case in root.child_elements().filter(|c| c.name() == Some("Case")) {
            count += 1;
            if let Err(message) = run_case(case) {
                failures.push(format!("{}: {}", path.display(), message));
            }
        }
    }

    assert!(count > 0);
    assert!(failures.is_empty(), "{} failing cases:\n{}", failures.len(), failures.join("\n"));
}
