//! Structural edits: add, insert, remove, replace, rename, extensions, safe add

use crate::errors::{PatchError, Result};
use crate::operation::{AddValue, Order, SafeAddCompare, EXTENSION_CONTAINER};
use crate::query::Query;
use crate::result::PatchResult;
use crate::xml::{Document, NodeId, XmlNode};
use std::collections::BTreeSet;

fn counted(operation: &'static str, nodes_affected: usize) -> PatchResult {
    PatchResult::Counted {
        operation,
        nodes_affected,
    }
}

fn require_parent(doc: &Document, query: &Query, node: NodeId) -> Result<()> {
    match doc.element_parent(node) {
        Some(_) => Ok(()),
        None => Err(PatchError::MissingParent {
            query: query.to_string(),
        }),
    }
}

/// Insert fragments as first or last children, or concatenate text
///
/// Fragments keep their declared order in both directions.
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn add(doc: &mut Document, query: &Query, value: &AddValue, order: Order) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        match (value, order) {
            (AddValue::Fragments(fragments), Order::Append) => {
                for fragment in fragments {
                    let id = doc.import(fragment);
                    doc.append_child(element, id);
                }
            }
            (AddValue::Fragments(fragments), Order::Prepend) => {
                for fragment in fragments.iter().rev() {
                    let id = doc.import(fragment);
                    doc.insert_child(element, 0, id);
                }
            }
            (AddValue::Text(text), Order::Append) => doc.append_text(element, text),
            (AddValue::Text(text), Order::Prepend) => doc.prepend_text(element, text),
        }
    }
    Ok(counted("PatchOperationAdd", found.len()))
}

/// Insert fragments as preceding or following siblings
///
/// # Errors
///
/// Returns `MissingParent` if a match is the root element.
pub fn insert(
    doc: &mut Document,
    query: &Query,
    fragments: &[XmlNode],
    order: Order,
) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        require_parent(doc, query, element)?;
        match order {
            Order::Prepend => {
                for fragment in fragments {
                    let id = doc.import(fragment);
                    doc.insert_before(element, id)?;
                }
            }
            Order::Append => {
                for fragment in fragments.iter().rev() {
                    let id = doc.import(fragment);
                    doc.insert_after(element, id)?;
                }
            }
        }
    }
    Ok(counted("PatchOperationInsert", found.len()))
}

/// Detach every match from its parent
///
/// # Errors
///
/// Returns `MissingParent` if a match is the root element.
pub fn remove(doc: &mut Document, query: &Query) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        require_parent(doc, query, element)?;
        doc.detach(element);
    }
    Ok(counted("PatchOperationRemove", found.len()))
}

/// Replace every match with the first fragment followed by the rest
///
/// # Errors
///
/// Returns `MissingParent` if a match is the root element.
pub fn replace(doc: &mut Document, query: &Query, fragments: &[XmlNode]) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    let Some((first, rest)) = fragments.split_first() else {
        return Ok(counted("PatchOperationReplace", 0));
    };
    for &element in &found {
        require_parent(doc, query, element)?;
        let mut cursor = doc.import(first);
        doc.replace(element, cursor)?;
        for fragment in rest {
            let id = doc.import(fragment);
            doc.insert_after(cursor, id)?;
            cursor = id;
        }
    }
    Ok(counted("PatchOperationReplace", found.len()))
}

/// Change the tag of every match
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn rename(doc: &mut Document, query: &Query, name: &str) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        doc.set_name(element, name);
    }
    Ok(counted("PatchOperationSetName", found.len()))
}

/// Append fragments to each match's extension container, creating it if needed
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn add_extension(doc: &mut Document, query: &Query, fragments: &[XmlNode]) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        let container = match doc.find_child(element, EXTENSION_CONTAINER) {
            Some(existing) => existing,
            None => {
                let created = doc.import(&XmlNode::element(EXTENSION_CONTAINER));
                doc.append_child(element, created);
                created
            }
        };
        for fragment in fragments {
            let id = doc.import(fragment);
            doc.append_child(container, id);
        }
    }
    Ok(counted("PatchOperationAddModExtension", found.len()))
}

/// Options for [`safe_add`]
#[derive(Debug, Clone, Copy)]
pub struct SafeAddOptions {
    pub safety_depth: Option<u32>,
    pub compare: SafeAddCompare,
    pub check_attributes: bool,
}

/// Add fragments only where no equivalent child exists
///
/// When an equivalent child is found, the fragment's own children are merged
/// into it one level deeper, until `safety_depth` levels have been visited.
///
/// # Errors
///
/// Returns `QueryShape` if the query selects non-elements.
pub fn safe_add(
    doc: &mut Document,
    query: &Query,
    fragments: &[XmlNode],
    options: SafeAddOptions,
) -> Result<PatchResult> {
    let found = query.elements(doc)?;
    for &element in &found {
        for fragment in fragments {
            safe_add_into(doc, element, fragment, options.safety_depth, &options);
        }
    }
    Ok(counted("PatchOperationSafeAdd", found.len()))
}

fn safe_add_into(
    doc: &mut Document,
    parent: NodeId,
    value: &XmlNode,
    depth: Option<u32>,
    options: &SafeAddOptions,
) {
    let existing = find_equivalent(doc, parent, value, options);
    match existing {
        None => {
            let id = doc.import(value);
            doc.append_child(parent, id);
        }
        Some(_) if depth == Some(1) => {}
        Some(target) => {
            for child in value.child_elements() {
                safe_add_into(doc, target, child, depth.map(|d| d - 1), options);
            }
        }
    }
}

fn find_equivalent(
    doc: &Document,
    parent: NodeId,
    value: &XmlNode,
    options: &SafeAddOptions,
) -> Option<NodeId> {
    let value_text = value.text_content();
    doc.child_elements(parent).find(|&child| {
        let equivalent = match options.compare {
            SafeAddCompare::Name => doc.name(child) == value.name(),
            SafeAddCompare::InnerText => doc.text(child) == value_text,
            SafeAddCompare::Both => doc.name(child) == value.name() && doc.text(child) == value_text,
        };
        equivalent && (!options.check_attributes || same_attributes(doc.attributes(child), value.attributes()))
    })
}

fn same_attributes(a: &[(String, String)], b: &[(String, String)]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(xml: &str) -> Document {
        Document::from_node(&XmlNode::parse(xml).unwrap())
    }

    fn q(s: &str) -> Query {
        Query::parse(s).unwrap()
    }

    fn frags(xml: &str) -> Vec<XmlNode> {
        XmlNode::parse(xml).unwrap().children().to_vec()
    }

    #[test]
    fn test_add_append_and_prepend() {
        let mut d = doc("<Defs><M><A/><B/></M></Defs>");
        add(&mut d, &q("/Defs/M"), &AddValue::Fragments(frags("<v><C/></v>")), Order::Append).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><M><A/><B/><C/></M></Defs>");

        let mut d = doc("<Defs><M><A/><B/></M></Defs>");
        add(&mut d, &q("/Defs/M"), &AddValue::Fragments(frags("<v><C/><D/></v>")), Order::Prepend).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><M><C/><D/><A/><B/></M></Defs>");
    }

    #[test]
    fn test_add_text_concatenates() {
        let mut d = doc("<Defs><label>wall</label></Defs>");
        let query = q("/Defs/label");
        add(&mut d, &query, &AddValue::Text(" (old)".into()), Order::Append).unwrap();
        add(&mut d, &query, &AddValue::Text("stone ".into()), Order::Prepend).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><label>stone wall (old)</label></Defs>");
    }

    #[test]
    fn test_insert_keeps_declared_order() {
        let mut d = doc("<Defs><M/></Defs>");
        insert(&mut d, &q("/Defs/M"), &frags("<v><C/><D/></v>"), Order::Append).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><M/><C/><D/></Defs>");

        let mut d = doc("<Defs><M/></Defs>");
        insert(&mut d, &q("/Defs/M"), &frags("<v><C/><D/></v>"), Order::Prepend).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><C/><D/><M/></Defs>");
    }

    #[test]
    fn test_remove_root_is_structural_error() {
        let mut d = doc("<Defs><A/></Defs>");
        let err = remove(&mut d, &q("/Defs")).unwrap_err();
        assert_eq!(err, PatchError::MissingParent { query: "/Defs".into() });
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><A/></Defs>");
    }

    #[test]
    fn test_replace_chains_following_fragments() {
        let mut d = doc("<Defs><A/><M/><B/></Defs>");
        let result = replace(&mut d, &q("/Defs/M"), &frags("<v><X/><Y/><Z/></v>")).unwrap();
        assert_eq!(result.nodes_affected(), 1);
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><A/><X/><Y/><Z/><B/></Defs>");
    }

    #[test]
    fn test_add_extension_reuses_container() {
        let mut d = doc("<Defs><T/><T><modExtensions><old/></modExtensions></T></Defs>");
        add_extension(&mut d, &q("/Defs/T"), &frags("<v><ext/></v>")).unwrap();
        assert_eq!(
            d.to_xml().to_compact_string(),
            "<Defs><T><modExtensions><ext/></modExtensions></T><T><modExtensions><old/><ext/></modExtensions></T></Defs>"
        );
    }

    #[test]
    fn test_rename_counts_matches() {
        let mut d = doc("<Defs><a/><a/></Defs>");
        let result = rename(&mut d, &q("/Defs/a"), "b").unwrap();
        assert_eq!(result.nodes_affected(), 2);
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><b/><b/></Defs>");
    }

    #[test]
    fn test_safe_add_merges_into_existing() {
        let mut d = doc("<Defs><T><stats><a>1</a></stats></T></Defs>");
        let options = SafeAddOptions {
            safety_depth: None,
            compare: SafeAddCompare::Name,
            check_attributes: false,
        };
        safe_add(&mut d, &q("/Defs/T"), &frags("<v><stats><a>2</a><b>3</b></stats><c/></v>"), options).unwrap();
        assert_eq!(
            d.to_xml().to_compact_string(),
            "<Defs><T><stats><a>1</a><b>3</b></stats><c/></T></Defs>"
        );
    }

    #[test]
    fn test_safe_add_depth_limit() {
        let mut d = doc("<Defs><T><stats/></T></Defs>");
        let options = SafeAddOptions {
            safety_depth: Some(1),
            compare: SafeAddCompare::Name,
            check_attributes: false,
        };
        safe_add(&mut d, &q("/Defs/T"), &frags("<v><stats><a/></stats></v>"), options).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><T><stats/></T></Defs>");
    }

    #[test]
    fn test_safe_add_inner_text_and_attributes() {
        let mut d = doc("<Defs><T><li>Wood</li></T></Defs>");
        let options = SafeAddOptions {
            safety_depth: None,
            compare: SafeAddCompare::InnerText,
            check_attributes: false,
        };
        safe_add(&mut d, &q("/Defs/T"), &frags("<v><li>Wood</li><li>Steel</li></v>"), options).unwrap();
        assert_eq!(d.to_xml().to_compact_string(), "<Defs><T><li>Wood</li><li>Steel</li></T></Defs>");

        let mut d = doc("<Defs><T><li A=\"1\">x</li></T></Defs>");
        let options = SafeAddOptions {
            safety_depth: None,
            compare: SafeAddCompare::Both,
            check_attributes: true,
        };
        safe_add(&mut d, &q("/Defs/T"), &frags("<v><li A=\"2\">x</li></v>"), options).unwrap();
        assert_eq!(
            d.to_xml().to_compact_string(),
            "<Defs><T><li A=\"1\">x</li><li A=\"2\">x</li></T></Defs>"
        );
    }
}
