//! Dispatcher: XML operation nodes to [`Operation`] values
//!
//! Every required child is validated here so that nothing malformed reaches
//! apply time. A whole file is parsed before any of it is applied.

use crate::errors::{PatchError, Result};
use crate::operation::{AddValue, Operation, OperationKind, Order, SafeAddCompare};
use crate::policy::{split_unit_list, OperationMeta, SuccessPolicy, UnknownOperationPolicy};
use crate::query::{Query, QueryKind};
use crate::xml::XmlNode;

/// Element name of top-level operations in a patch file
pub const OPERATION_TAG: &str = "Operation";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationParser {
    unknown: UnknownOperationPolicy,
}

impl OperationParser {
    pub fn new(unknown: UnknownOperationPolicy) -> Self {
        Self { unknown }
    }

    pub fn unknown_policy(&self) -> UnknownOperationPolicy {
        self.unknown
    }

    /// Parse every top-level `<Operation>` of a patch file
    ///
    /// # Errors
    ///
    /// Returns the first parse-time error; no operations are returned in
    /// that case.
    pub fn parse_file(&self, root: &XmlNode) -> Result<Vec<Operation>> {
        self.collect(root, OPERATION_TAG)
    }

    /// Parse one operation node
    ///
    /// Returns `Ok(None)` for an unknown class when unknown operations are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPatch`, `InvalidQuery` or `UnknownOperation`.
    pub fn parse_operation(&self, node: &XmlNode) -> Result<Option<Operation>> {
        let class = node
            .attribute("Class")
            .ok_or_else(|| PatchError::malformed("operation has no Class attribute"))?;

        let kind = match class {
            "PatchOperationAdd" => OperationKind::Add {
                query: element_query(node, class)?,
                value: add_value(node)?,
                order: order(node, Order::Append)?,
            },
            "PatchOperationInsert" => OperationKind::Insert {
                query: element_query(node, class)?,
                fragments: fragments(node)?,
                order: order(node, Order::Prepend)?,
            },
            "PatchOperationRemove" => OperationKind::Remove {
                query: element_query(node, class)?,
            },
            "PatchOperationReplace" => {
                let query = element_query(node, class)?;
                let fragments = fragments(node)?;
                if fragments.is_empty() {
                    return Err(PatchError::malformed(
                        "PatchOperationReplace needs at least one value element",
                    ));
                }
                OperationKind::Replace { query, fragments }
            }
            "PatchOperationAttributeAdd" => OperationKind::AttributeAdd {
                query: element_query(node, class)?,
                attribute: attribute_name(node)?,
                value: required_text(node, "value")?,
            },
            "PatchOperationAttributeSet" => OperationKind::AttributeSet {
                query: element_query(node, class)?,
                attribute: attribute_name(node)?,
                value: required_text(node, "value")?,
            },
            "PatchOperationAttributeRemove" => OperationKind::AttributeRemove {
                query: element_query(node, class)?,
                attribute: attribute_name(node)?,
            },
            "PatchOperationAddModExtension" => OperationKind::AddExtension {
                query: element_query(node, class)?,
                fragments: fragments(node)?,
            },
            "PatchOperationSetName" => {
                let query = element_query(node, class)?;
                let name = required_text(node, "name")?;
                if name.trim().is_empty() {
                    return Err(PatchError::malformed("name element has no text"));
                }
                OperationKind::Rename {
                    query,
                    name: name.trim().to_string(),
                }
            }
            "PatchOperationSequence" => OperationKind::Sequence {
                operations: self.collect(required_child(node, "operations")?, "li")?,
            },
            "PatchOperationConditional" => OperationKind::Conditional {
                query: any_query(node)?,
                on_match: self.branch(node, "match")?,
                on_nomatch: self.branch(node, "nomatch")?,
            },
            "PatchOperationFindMod" => OperationKind::UnitPresence {
                units: unit_names(node)?,
                on_match: self.branch(node, "match")?,
                on_nomatch: self.branch(node, "nomatch")?,
            },
            "PatchOperationTest" => OperationKind::Test {
                query: any_query(node)?,
            },
            "PatchOperationSafeAdd" => OperationKind::SafeAdd {
                query: element_query(node, class)?,
                fragments: fragments(node)?,
                safety_depth: safety_depth(node)?,
                compare: safe_add_compare(node)?,
                check_attributes: check_attributes(node)?,
            },
            other => {
                return match self.unknown {
                    UnknownOperationPolicy::Skip => Ok(None),
                    UnknownOperationPolicy::Fail => Err(PatchError::UnknownOperation {
                        class: other.to_string(),
                    }),
                }
            }
        };

        Ok(Some(Operation {
            meta: meta(node)?,
            kind,
        }))
    }

    fn collect(&self, container: &XmlNode, tag: &str) -> Result<Vec<Operation>> {
        let mut operations = Vec::new();
        for child in container.child_elements().filter(|c| c.name() == Some(tag)) {
            if let Some(op) = self.parse_operation(child)? {
                operations.push(op);
            }
        }
        Ok(operations)
    }

    fn branch(&self, node: &XmlNode, tag: &str) -> Result<Option<Box<Operation>>> {
        match node.child(tag) {
            Some(child) => Ok(self.parse_operation(child)?.map(Box::new)),
            None => Ok(None),
        }
    }
}

fn required_child<'a>(node: &'a XmlNode, tag: &str) -> Result<&'a XmlNode> {
    node.child(tag)
        .ok_or_else(|| PatchError::malformed(format!("Element not found: {}", tag)))
}

fn required_text(node: &XmlNode, tag: &str) -> Result<String> {
    Ok(required_child(node, tag)?.text_content().unwrap_or_default())
}

fn any_query(node: &XmlNode) -> Result<Query> {
    let text = required_text(node, "xpath")?;
    if text.trim().is_empty() {
        return Err(PatchError::malformed("xpath element has no text"));
    }
    Query::parse(&text)
}

fn element_query(node: &XmlNode, class: &str) -> Result<Query> {
    let query = any_query(node)?;
    if query.kind() != QueryKind::Element {
        return Err(PatchError::malformed(format!(
            "{} only operates on elements: {}",
            class, query
        )));
    }
    Ok(query)
}

fn fragments(node: &XmlNode) -> Result<Vec<XmlNode>> {
    Ok(required_child(node, "value")?
        .child_elements()
        .cloned()
        .collect())
}

fn add_value(node: &XmlNode) -> Result<AddValue> {
    let value = required_child(node, "value")?;
    if value.child_elements().next().is_some() {
        return Ok(AddValue::Fragments(value.child_elements().cloned().collect()));
    }
    match value.text_content() {
        Some(text) if !text.is_empty() => Ok(AddValue::Text(text)),
        _ => Ok(AddValue::Fragments(Vec::new())),
    }
}

fn attribute_name(node: &XmlNode) -> Result<String> {
    let name = required_text(node, "attribute")?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PatchError::malformed("attribute element has no text"));
    }
    Ok(name.to_string())
}

fn order(node: &XmlNode, default: Order) -> Result<Order> {
    match node.child("order") {
        None => Ok(default),
        Some(child) => match child.text_content().as_deref().map(str::trim) {
            Some("Append") => Ok(Order::Append),
            Some("Prepend") => Ok(Order::Prepend),
            _ => Err(PatchError::malformed(
                "order should be either Append or Prepend",
            )),
        },
    }
}

fn unit_names(node: &XmlNode) -> Result<Vec<String>> {
    let mods = required_child(node, "mods")?;
    mods.child_elements()
        .map(|child| {
            if child.name() != Some("li") {
                return Err(PatchError::malformed(
                    "<mods> node in PatchOperationFindMod should only contain <li> elements",
                ));
            }
            Ok(child.text_content().unwrap_or_default())
        })
        .collect()
}

fn safety_depth(node: &XmlNode) -> Result<Option<u32>> {
    let Some(child) = node.child("safetyDepth") else {
        return Ok(None);
    };
    let text = child.text_content().unwrap_or_default();
    let depth: i64 = text
        .trim()
        .parse()
        .map_err(|_| PatchError::malformed(format!("incorrect safetyDepth: {}", text)))?;
    if depth <= 0 {
        return Ok(None);
    }
    u32::try_from(depth)
        .map(Some)
        .map_err(|_| PatchError::malformed(format!("incorrect safetyDepth: {}", text)))
}

fn safe_add_compare(node: &XmlNode) -> Result<SafeAddCompare> {
    match node.child("compare").map(|c| c.text_content().unwrap_or_default()) {
        None => Ok(SafeAddCompare::Name),
        Some(text) => match text.trim() {
            "Name" => Ok(SafeAddCompare::Name),
            "InnerText" => Ok(SafeAddCompare::InnerText),
            "Both" => Ok(SafeAddCompare::Both),
            other => Err(PatchError::malformed(format!(
                "incorrect compare value: {}",
                other
            ))),
        },
    }
}

fn check_attributes(node: &XmlNode) -> Result<bool> {
    match node
        .child("checkAttributes")
        .map(|c| c.text_content().unwrap_or_default())
    {
        None => Ok(false),
        Some(text) => match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(PatchError::malformed(format!(
                "incorrect checkAttributes value: {}",
                other
            ))),
        },
    }
}

fn meta(node: &XmlNode) -> Result<OperationMeta> {
    let success = match node.child("success") {
        None => SuccessPolicy::Normal,
        Some(child) => child.text_content().unwrap_or_default().trim().parse()?,
    };
    Ok(OperationMeta {
        requires_all: node.attribute("MayRequire").map(split_unit_list).unwrap_or_default(),
        requires_any: node
            .attribute("MayRequireAnyOf")
            .map(split_unit_list)
            .unwrap_or_default(),
        success,
    })
}
