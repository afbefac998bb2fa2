//! Arena-backed mutable working document
//!
//! All nodes live in one `Vec` and are addressed by [`NodeId`]. Slot 0 is a
//! virtual document node whose only child is the root element, so absolute
//! queries start above the root and the root element itself has no element
//! parent.
//!
//! Slots are never freed. Remove and Replace only unlink nodes, and every
//! fragment insertion imports a fresh copy, so the arena grows for the
//! lifetime of the document. A document lives for one run, so this is bounded
//! by the total number of nodes merged and inserted during that run.

use super::node::XmlNode;
use crate::errors::{PatchError, Result};

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
}

const DOCUMENT_NODE: NodeId = NodeId(0);
const ROOT_ELEMENT: NodeId = NodeId(1);

impl Document {
    /// Create a document holding an empty root element
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self::from_node(&XmlNode::element(root_tag))
    }

    /// Create a document from an owned tree
    ///
    /// A text node is wrapped in an unnamed root so the root is always an
    /// element.
    pub fn from_node(node: &XmlNode) -> Self {
        let mut doc = Self {
            slots: vec![Slot {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        };
        let root = match node {
            XmlNode::Element { .. } => doc.import(node),
            XmlNode::Text(_) => {
                let root = doc.import(&XmlNode::element(""));
                let text = doc.import(node);
                doc.attach(root, text, None);
                root
            }
        };
        doc.attach(DOCUMENT_NODE, root, None);
        doc
    }

    /// The virtual node above the root element
    pub fn document_node(&self) -> NodeId {
        DOCUMENT_NODE
    }

    pub fn root(&self) -> NodeId {
        ROOT_ELEMENT
    }

    pub fn root_tag(&self) -> &str {
        self.name(ROOT_ELEMENT).unwrap_or_default()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.slots[id.0].data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Element
    }

    // ===== Element data =====

    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.slots[id.0].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Rename an element; no effect on other node kinds
    pub fn set_name(&mut self, id: NodeId, new_name: &str) {
        if let NodeData::Element { name, .. } = &mut self.slots[id.0].data {
            *name = new_name.to_string();
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.slots[id.0].data {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.slots[id.0].data {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let NodeData::Element { attributes, .. } = &mut self.slots[id.0].data {
            let pos = attributes.iter().position(|(k, _)| k == name)?;
            return Some(attributes.remove(pos).1);
        }
        None
    }

    /// Value of a text node
    pub fn text_value(&self, id: NodeId) -> Option<&str> {
        match &self.slots[id.0].data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Concatenated direct text children of an element, `None` if there are none
    pub fn text(&self, id: NodeId) -> Option<String> {
        let mut out: Option<String> = None;
        for child in &self.slots[id.0].children {
            if let Some(t) = self.text_value(*child) {
                out.get_or_insert_with(String::new).push_str(t);
            }
        }
        out
    }

    /// Concatenated text of all descendants
    pub fn string_value(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.slots[id.0].data {
            NodeData::Text(t) => out.push_str(t),
            _ => {
                for child in &self.slots[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Text before the first child element, if the element has any
    fn leading_text(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0]
            .children
            .first()
            .copied()
            .filter(|first| self.text_value(*first).is_some())
    }

    /// Append to the element's leading text
    ///
    /// In mixed content `<a>x<b/></a>` the value lands after `x`, before `<b/>`.
    pub fn append_text(&mut self, id: NodeId, value: &str) {
        match self.leading_text(id) {
            Some(text) => {
                if let NodeData::Text(t) = &mut self.slots[text.0].data {
                    t.push_str(value);
                }
            }
            None => {
                let text = self.push(NodeData::Text(value.to_string()));
                self.attach(id, text, Some(0));
            }
        }
    }

    /// Prepend to the element's leading text
    pub fn prepend_text(&mut self, id: NodeId, value: &str) {
        match self.leading_text(id) {
            Some(text) => {
                if let NodeData::Text(t) = &mut self.slots[text.0].data {
                    t.insert_str(0, value);
                }
            }
            None => {
                let text = self.push(NodeData::Text(value.to_string()));
                self.attach(id, text, Some(0));
            }
        }
    }

    // ===== Navigation =====

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    /// First child element with the given name
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id).find(|c| self.name(*c) == Some(name))
    }

    /// Parent node, which may be the document node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// Parent only if it is an element
    pub fn element_parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    /// Whether the node is still reachable from the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == DOCUMENT_NODE
    }

    /// Node followed by its descendants, in document order
    pub fn descendants_or_self(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    // ===== Structural mutation =====

    /// Deep-copy an owned tree into the arena as a detached node
    pub fn import(&mut self, node: &XmlNode) -> NodeId {
        match node {
            XmlNode::Text(t) => self.push(NodeData::Text(t.clone())),
            XmlNode::Element {
                name,
                attributes,
                children,
            } => {
                let id = self.push(NodeData::Element {
                    name: name.clone(),
                    attributes: attributes.clone(),
                });
                for child in children {
                    let child_id = self.import(child);
                    self.attach(id, child_id, None);
                }
                id
            }
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.attach(parent, child, None);
    }

    /// Insert `child` at `index` among the children of `parent`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let index = index.min(self.slots[parent.0].children.len());
        self.attach(parent, child, Some(index));
    }

    /// Insert `new` as the preceding sibling of `target`
    ///
    /// # Errors
    ///
    /// Returns `MissingParent` if `target` has no element parent.
    pub fn insert_before(&mut self, target: NodeId, new: NodeId) -> Result<()> {
        let (parent, index) = self.sibling_slot(target)?;
        self.insert_child(parent, index, new);
        Ok(())
    }

    /// Insert `new` as the following sibling of `target`
    ///
    /// # Errors
    ///
    /// Returns `MissingParent` if `target` has no element parent.
    pub fn insert_after(&mut self, target: NodeId, new: NodeId) -> Result<()> {
        let (parent, index) = self.sibling_slot(target)?;
        self.insert_child(parent, index + 1, new);
        Ok(())
    }

    /// Unlink a node from its parent
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Put `new` where `old` is and detach `old`
    ///
    /// # Errors
    ///
    /// Returns `MissingParent` if `old` has no element parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let (parent, index) = self.sibling_slot(old)?;
        self.detach(old);
        self.insert_child(parent, index, new);
        Ok(())
    }

    /// Append the top-level children of `source` under the root element
    ///
    /// Returns the number of nodes appended.
    ///
    /// # Errors
    ///
    /// Returns `DifferentRoots` if `source`'s tag differs from the root tag.
    pub fn merge(&mut self, source: &XmlNode) -> Result<usize> {
        let found = source.name().unwrap_or_default();
        if found != self.root_tag() {
            return Err(PatchError::DifferentRoots {
                expected: self.root_tag().to_string(),
                found: found.to_string(),
            });
        }
        let mut added = 0;
        for child in source.child_elements() {
            let id = self.import(child);
            self.attach(ROOT_ELEMENT, id, None);
            added += 1;
        }
        Ok(added)
    }

    /// Owned copy of a subtree
    pub fn to_node(&self, id: NodeId) -> XmlNode {
        match &self.slots[id.0].data {
            NodeData::Text(t) => XmlNode::Text(t.clone()),
            NodeData::Element { name, attributes } => XmlNode::Element {
                name: name.clone(),
                attributes: attributes.clone(),
                children: self.children(id).iter().map(|c| self.to_node(*c)).collect(),
            },
            NodeData::Document => self.to_node(ROOT_ELEMENT),
        }
    }

    /// Owned copy of the whole document
    pub fn to_xml(&self) -> XmlNode {
        self.to_node(ROOT_ELEMENT)
    }

    fn sibling_slot(&self, target: NodeId) -> Result<(NodeId, usize)> {
        let parent = self
            .element_parent(target)
            .ok_or_else(|| PatchError::MissingParent {
                query: self.describe(target),
            })?;
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == target)
            .ok_or_else(|| PatchError::MissingParent {
                query: self.describe(target),
            })?;
        Ok((parent, index))
    }

    /// Slash-separated element path from the root, for diagnostics
    pub fn describe(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(name) = self.name(node) {
                parts.push(name.to_string());
            }
            current = self.parent(node);
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.slots.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        self.slots[child.0].parent = Some(parent);
        let children = &mut self.slots[parent.0].children;
        match index {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
    }
}
