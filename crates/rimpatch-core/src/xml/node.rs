//! Owned XML trees
//!
//! `XmlNode` is the immutable-by-convention representation used for parsed
//! files and for fragment templates held by operations. The mutable working
//! document lives in [`crate::xml::Document`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlNode {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<XmlNode>,
    },
    Text(String),
}

impl XmlNode {
    /// Create an empty element
    pub fn element(name: impl Into<String>) -> Self {
        XmlNode::Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        XmlNode::Text(value.into())
    }

    /// Builder: set an attribute (replacing an existing one with the same name)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let XmlNode::Element { attributes, .. } = &mut self {
            let name = name.into();
            let value = value.into();
            match attributes.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => attributes.push((name, value)),
            }
        }
        self
    }

    /// Builder: append a child node
    pub fn with_child(mut self, child: XmlNode) -> Self {
        if let XmlNode::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Builder: append a text child
    pub fn with_text(self, value: impl Into<String>) -> Self {
        self.with_child(XmlNode::Text(value.into()))
    }

    /// Element name, `None` for text nodes
    pub fn name(&self) -> Option<&str> {
        match self {
            XmlNode::Element { name, .. } => Some(name),
            XmlNode::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, XmlNode::Element { .. })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        match self {
            XmlNode::Element { attributes, .. } => attributes,
            XmlNode::Text(_) => &[],
        }
    }

    pub fn children(&self) -> &[XmlNode] {
        match self {
            XmlNode::Element { children, .. } => children,
            XmlNode::Text(_) => &[],
        }
    }

    /// Child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children().iter().filter(|c| c.is_element())
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.child_elements().find(|c| c.name() == Some(name))
    }

    /// Concatenated direct text children, `None` if there are none
    pub fn text_content(&self) -> Option<String> {
        match self {
            XmlNode::Text(t) => Some(t.clone()),
            XmlNode::Element { children, .. } => {
                let mut out: Option<String> = None;
                for child in children {
                    if let XmlNode::Text(t) = child {
                        out.get_or_insert_with(String::new).push_str(t);
                    }
                }
                out
            }
        }
    }

    /// Text content of the named child element
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text_content().unwrap_or_default())
    }
}
