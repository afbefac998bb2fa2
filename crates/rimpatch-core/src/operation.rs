//! Operation AST
//!
//! Operations are built once from their XML form by the dispatcher and are
//! immutable afterwards. Fragment templates are owned here and only ever
//! cloned into the working document.

use crate::policy::{OperationMeta, SuccessPolicy};
use crate::query::Query;
use crate::xml::XmlNode;

/// Where new nodes go relative to a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Prepend,
    Append,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Prepend => "Prepend",
            Order::Append => "Append",
        }
    }
}

/// Payload of an `Add`
#[derive(Debug, Clone, PartialEq)]
pub enum AddValue {
    /// Element fragments inserted as children
    Fragments(Vec<XmlNode>),
    /// Plain text concatenated to the element's text
    Text(String),
}

/// How `SafeAdd` decides that a child already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SafeAddCompare {
    #[default]
    Name,
    InnerText,
    Both,
}

impl SafeAddCompare {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeAddCompare::Name => "Name",
            SafeAddCompare::InnerText => "InnerText",
            SafeAddCompare::Both => "Both",
        }
    }
}

/// Variant-specific part of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    /// Insert fragments as first/last children, or concatenate text
    Add {
        query: Query,
        value: AddValue,
        order: Order,
    },

    /// Insert fragments as preceding/following siblings
    Insert {
        query: Query,
        fragments: Vec<XmlNode>,
        order: Order,
    },

    Remove { query: Query },

    /// Replace each match with the fragments (at least one)
    Replace {
        query: Query,
        fragments: Vec<XmlNode>,
    },

    /// Set an attribute only where it is absent
    AttributeAdd {
        query: Query,
        attribute: String,
        value: String,
    },

    AttributeSet {
        query: Query,
        attribute: String,
        value: String,
    },

    AttributeRemove { query: Query, attribute: String },

    /// Append fragments to each match's `modExtensions` child
    AddExtension {
        query: Query,
        fragments: Vec<XmlNode>,
    },

    /// Change each match's tag name
    Rename { query: Query, name: String },

    /// Apply children in order until one is unsuccessful
    Sequence { operations: Vec<Operation> },

    /// Branch on whether a query matches
    Conditional {
        query: Query,
        on_match: Option<Box<Operation>>,
        on_nomatch: Option<Box<Operation>>,
    },

    /// Branch on whether every named unit is active
    UnitPresence {
        units: Vec<String>,
        on_match: Option<Box<Operation>>,
        on_nomatch: Option<Box<Operation>>,
    },

    /// Succeeds iff the query matches; never mutates
    Test { query: Query },

    /// Add fragments only where no equivalent child exists
    SafeAdd {
        query: Query,
        fragments: Vec<XmlNode>,
        /// `None` recurses without limit
        safety_depth: Option<u32>,
        compare: SafeAddCompare,
        check_attributes: bool,
    },
}

/// Name of the container `AddExtension` appends to
pub const EXTENSION_CONTAINER: &str = "modExtensions";

impl OperationKind {
    /// The `Class` attribute value for this variant
    pub fn class(&self) -> &'static str {
        match self {
            OperationKind::Add { .. } => "PatchOperationAdd",
            OperationKind::Insert { .. } => "PatchOperationInsert",
            OperationKind::Remove { .. } => "PatchOperationRemove",
            OperationKind::Replace { .. } => "PatchOperationReplace",
            OperationKind::AttributeAdd { .. } => "PatchOperationAttributeAdd",
            OperationKind::AttributeSet { .. } => "PatchOperationAttributeSet",
            OperationKind::AttributeRemove { .. } => "PatchOperationAttributeRemove",
            OperationKind::AddExtension { .. } => "PatchOperationAddModExtension",
            OperationKind::Rename { .. } => "PatchOperationSetName",
            OperationKind::Sequence { .. } => "PatchOperationSequence",
            OperationKind::Conditional { .. } => "PatchOperationConditional",
            OperationKind::UnitPresence { .. } => "PatchOperationFindMod",
            OperationKind::Test { .. } => "PatchOperationTest",
            OperationKind::SafeAdd { .. } => "PatchOperationSafeAdd",
        }
    }

    /// The target query, for variants that have one
    pub fn query(&self) -> Option<&Query> {
        match self {
            OperationKind::Add { query, .. }
            | OperationKind::Insert { query, .. }
            | OperationKind::Remove { query }
            | OperationKind::Replace { query, .. }
            | OperationKind::AttributeAdd { query, .. }
            | OperationKind::AttributeSet { query, .. }
            | OperationKind::AttributeRemove { query, .. }
            | OperationKind::AddExtension { query, .. }
            | OperationKind::Rename { query, .. }
            | OperationKind::Conditional { query, .. }
            | OperationKind::Test { query }
            | OperationKind::SafeAdd { query, .. } => Some(query),
            OperationKind::Sequence { .. } | OperationKind::UnitPresence { .. } => None,
        }
    }
}

/// A parsed operation: gating/policy wrapper plus variant
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub meta: OperationMeta,
    pub kind: OperationKind,
}

impl Operation {
    /// Operation with no gating and the `Normal` policy
    pub fn new(kind: OperationKind) -> Self {
        Self {
            meta: OperationMeta::default(),
            kind,
        }
    }

    pub fn with_success(mut self, success: SuccessPolicy) -> Self {
        self.meta.success = success;
        self
    }

    pub fn with_requires_all<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.requires_all = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn class(&self) -> &'static str {
        self.kind.class()
    }

    /// Short human-readable label, e.g. `PatchOperationAdd /Defs/ThingDef`
    pub fn describe(&self) -> String {
        match self.kind.query() {
            Some(query) => format!("{} {}", self.class(), query),
            None => self.class().to_string(),
        }
    }

    /// Canonical `<Operation>` element for this operation
    pub fn to_node(&self) -> XmlNode {
        self.to_node_named("Operation")
    }

    /// Same as [`Operation::to_node`] with a custom element name, as used for
    /// `li`, `match` and `nomatch` containers
    pub fn to_node_named(&self, tag: &str) -> XmlNode {
        let mut node = XmlNode::element(tag).with_attribute("Class", self.class());
        if !self.meta.requires_all.is_empty() {
            node = node.with_attribute("MayRequire", self.meta.requires_all.join(","));
        }
        if !self.meta.requires_any.is_empty() {
            node = node.with_attribute("MayRequireAnyOf", self.meta.requires_any.join(","));
        }

        node = match &self.kind {
            OperationKind::Add {
                query,
                value,
                order,
            } => {
                let value = match value {
                    AddValue::Fragments(fragments) => fragment_container("value", fragments),
                    AddValue::Text(text) => text_child("value", text),
                };
                let node = node.with_child(xpath(query)).with_child(value);
                with_order(node, *order, Order::Append)
            }
            OperationKind::Insert {
                query,
                fragments,
                order,
            } => {
                let node = node
                    .with_child(xpath(query))
                    .with_child(fragment_container("value", fragments));
                with_order(node, *order, Order::Prepend)
            }
            OperationKind::Remove { query } | OperationKind::Test { query } => {
                node.with_child(xpath(query))
            }
            OperationKind::Replace { query, fragments }
            | OperationKind::AddExtension { query, fragments } => node
                .with_child(xpath(query))
                .with_child(fragment_container("value", fragments)),
            OperationKind::AttributeAdd {
                query,
                attribute,
                value,
            }
            | OperationKind::AttributeSet {
                query,
                attribute,
                value,
            } => node
                .with_child(xpath(query))
                .with_child(text_child("attribute", attribute))
                .with_child(text_child("value", value)),
            OperationKind::AttributeRemove { query, attribute } => node
                .with_child(xpath(query))
                .with_child(text_child("attribute", attribute)),
            OperationKind::Rename { query, name } => node
                .with_child(xpath(query))
                .with_child(text_child("name", name)),
            OperationKind::Sequence { operations } => {
                let mut list = XmlNode::element("operations");
                for op in operations {
                    list = list.with_child(op.to_node_named("li"));
                }
                node.with_child(list)
            }
            OperationKind::Conditional {
                query,
                on_match,
                on_nomatch,
            } => with_branches(node.with_child(xpath(query)), on_match, on_nomatch),
            OperationKind::UnitPresence {
                units,
                on_match,
                on_nomatch,
            } => {
                let mut mods = XmlNode::element("mods");
                for unit in units {
                    mods = mods.with_child(text_child("li", unit));
                }
                with_branches(node.with_child(mods), on_match, on_nomatch)
            }
            OperationKind::SafeAdd {
                query,
                fragments,
                safety_depth,
                compare,
                check_attributes,
            } => {
                let mut node = node
                    .with_child(xpath(query))
                    .with_child(fragment_container("value", fragments));
                if let Some(depth) = safety_depth {
                    node = node.with_child(text_child("safetyDepth", &depth.to_string()));
                }
                if *compare != SafeAddCompare::Name {
                    node = node.with_child(text_child("compare", compare.as_str()));
                }
                if *check_attributes {
                    node = node.with_child(text_child("checkAttributes", "true"));
                }
                node
            }
        };

        if self.meta.success != SuccessPolicy::Normal {
            node = node.with_child(text_child("success", self.meta.success.as_str()));
        }
        node
    }
}

fn xpath(query: &Query) -> XmlNode {
    text_child("xpath", query.as_str())
}

fn text_child(tag: &str, text: &str) -> XmlNode {
    let node = XmlNode::element(tag);
    if text.is_empty() {
        node
    } else {
        node.with_text(text)
    }
}

fn fragment_container(tag: &str, fragments: &[XmlNode]) -> XmlNode {
    fragments
        .iter()
        .fold(XmlNode::element(tag), |node, f| node.with_child(f.clone()))
}

fn with_order(node: XmlNode, order: Order, default: Order) -> XmlNode {
    if order == default {
        node
    } else {
        node.with_child(text_child("order", order.as_str()))
    }
}

fn with_branches(
    mut node: XmlNode,
    on_match: &Option<Box<Operation>>,
    on_nomatch: &Option<Box<Operation>>,
) -> XmlNode {
    if let Some(op) = on_match {
        node = node.with_child(op.to_node_named("match"));
    }
    if let Some(op) = on_nomatch {
        node = node.with_child(op.to_node_named("nomatch"));
    }
    node
}
