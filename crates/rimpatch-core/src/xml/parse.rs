//! XML text to [`XmlNode`]

use super::node::XmlNode;
use crate::errors::Result;

impl XmlNode {
    /// Parse an XML document and return its root element
    ///
    /// Comments and processing instructions are dropped. Whitespace-only text
    /// inside an element that also has element children is dropped, so
    /// indentation never shows up as content.
    ///
    /// # Errors
    ///
    /// Returns `XmlParse` if the text is not well-formed XML.
    pub fn parse(text: &str) -> Result<XmlNode> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(convert(doc.root_element()))
    }
}

fn convert(node: roxmltree::Node<'_, '_>) -> XmlNode {
    let has_element_children = node.children().any(|c| c.is_element());

    let attributes = node
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert(child));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if has_element_children && text.trim().is_empty() {
                continue;
            }
            children.push(XmlNode::Text(text.to_string()));
        }
    }

    XmlNode::Element {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
    }
}
