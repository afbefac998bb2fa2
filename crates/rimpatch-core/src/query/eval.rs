//! Evaluation of parsed paths against a [`Document`]

use super::syntax::{Axis, CompareOp, Expr, LocationPath, NodeTest, Step};
use crate::xml::{Document, NodeId, NodeKind};
use std::collections::HashMap;

/// One selected item: a tree node or an attribute of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    Node(NodeId),
    Attribute(NodeId, usize),
}

#[derive(Debug, Clone)]
enum Value {
    Nodes(Vec<Item>),
    Str(String),
    Num(f64),
    Bool(bool),
}

#[derive(Clone, Copy)]
struct Context {
    item: Item,
    position: usize,
    size: usize,
}

pub(crate) struct Evaluator<'d> {
    doc: &'d Document,
    order: HashMap<NodeId, usize>,
}

impl<'d> Evaluator<'d> {
    pub(crate) fn new(doc: &'d Document) -> Self {
        let order = doc
            .descendants_or_self(doc.document_node())
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        Self { doc, order }
    }

    /// Evaluate a union of paths from the document node
    pub(crate) fn select(&self, paths: &[LocationPath]) -> Vec<Item> {
        let start = Item::Node(self.doc.document_node());
        let mut items = Vec::new();
        for path in paths {
            items.extend(self.path(path, start));
        }
        self.sort_dedup(&mut items);
        items
    }

    fn order_key(&self, item: &Item) -> (usize, usize, usize) {
        match item {
            Item::Node(id) => (self.order.get(id).copied().unwrap_or(usize::MAX), 0, 0),
            Item::Attribute(id, index) => {
                (self.order.get(id).copied().unwrap_or(usize::MAX), 1, *index)
            }
        }
    }

    fn sort_dedup(&self, items: &mut Vec<Item>) {
        items.sort_by_key(|item| self.order_key(item));
        items.dedup();
    }

    fn path(&self, path: &LocationPath, start: Item) -> Vec<Item> {
        let mut current = if path.absolute {
            vec![Item::Node(self.doc.document_node())]
        } else {
            vec![start]
        };
        for step in &path.steps {
            let mut next = Vec::new();
            for item in &current {
                next.extend(self.step(step, *item));
            }
            self.sort_dedup(&mut next);
            current = next;
        }
        current
    }

    fn step(&self, step: &Step, item: Item) -> Vec<Item> {
        let mut candidates: Vec<Item> = self
            .axis(step.axis, item)
            .into_iter()
            .filter(|c| self.test(step.axis, &step.test, c))
            .collect();

        for predicate in &step.predicates {
            let size = candidates.len();
            candidates = candidates
                .into_iter()
                .enumerate()
                .filter(|(i, c)| {
                    let context = Context {
                        item: *c,
                        position: i + 1,
                        size,
                    };
                    match self.expr(predicate, context) {
                        Value::Num(n) => n == (i + 1) as f64,
                        other => truthy(&other),
                    }
                })
                .map(|(_, c)| c)
                .collect();
        }
        candidates
    }

    fn axis(&self, axis: Axis, item: Item) -> Vec<Item> {
        match (axis, item) {
            (Axis::SelfNode, _) => vec![item],
            (Axis::Parent, Item::Attribute(owner, _)) => vec![Item::Node(owner)],
            (Axis::Parent, Item::Node(id)) => {
                self.doc.parent(id).map(Item::Node).into_iter().collect()
            }
            (Axis::Child, Item::Node(id)) => {
                self.doc.children(id).iter().map(|c| Item::Node(*c)).collect()
            }
            (Axis::DescendantOrSelf, Item::Node(id)) => self
                .doc
                .descendants_or_self(id)
                .into_iter()
                .map(Item::Node)
                .collect(),
            (Axis::Attribute, Item::Node(id)) => (0..self.doc.attributes(id).len())
                .map(|i| Item::Attribute(id, i))
                .collect(),
            (Axis::Child | Axis::DescendantOrSelf | Axis::Attribute, Item::Attribute(..)) => {
                Vec::new()
            }
        }
    }

    fn test(&self, axis: Axis, test: &NodeTest, item: &Item) -> bool {
        match item {
            Item::Attribute(owner, index) => {
                let name = self
                    .doc
                    .attributes(*owner)
                    .get(*index)
                    .map(|(k, _)| k.as_str());
                match test {
                    NodeTest::Name(n) => axis == Axis::Attribute && name == Some(n.as_str()),
                    NodeTest::Any => axis == Axis::Attribute,
                    NodeTest::Node => true,
                    NodeTest::Text => false,
                }
            }
            Item::Node(id) => {
                let kind = self.doc.kind(*id);
                match test {
                    NodeTest::Name(n) => {
                        kind == NodeKind::Element && self.doc.name(*id) == Some(n.as_str())
                    }
                    NodeTest::Any => kind == NodeKind::Element,
                    NodeTest::Text => kind == NodeKind::Text,
                    NodeTest::Node => true,
                }
            }
        }
    }

    fn string_of(&self, item: &Item) -> String {
        match item {
            Item::Node(id) => self.doc.string_value(*id),
            Item::Attribute(owner, index) => self
                .doc
                .attributes(*owner)
                .get(*index)
                .map(|(_, v)| v.clone())
                .unwrap_or_default(),
        }
    }

    fn to_string(&self, value: &Value) -> String {
        match value {
            Value::Nodes(items) => items.first().map(|i| self.string_of(i)).unwrap_or_default(),
            Value::Str(s) => s.clone(),
            Value::Num(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
        }
    }

    fn expr(&self, expr: &Expr, context: Context) -> Value {
        match expr {
            Expr::Path(path) => Value::Nodes(self.path(path, context.item)),
            Expr::Literal(s) => Value::Str(s.clone()),
            Expr::Number(n) => Value::Num(*n),
            Expr::Or(a, b) => Value::Bool(
                truthy(&self.expr(a, context)) || truthy(&self.expr(b, context)),
            ),
            Expr::And(a, b) => Value::Bool(
                truthy(&self.expr(a, context)) && truthy(&self.expr(b, context)),
            ),
            Expr::Not(inner) => Value::Bool(!truthy(&self.expr(inner, context))),
            Expr::Compare(op, a, b) => {
                let left = self.expr(a, context);
                let right = self.expr(b, context);
                Value::Bool(self.compare(*op, &left, &right))
            }
            Expr::Contains(a, b) => {
                let haystack = self.to_string(&self.expr(a, context));
                let needle = self.to_string(&self.expr(b, context));
                Value::Bool(haystack.contains(&needle))
            }
            Expr::StartsWith(a, b) => {
                let haystack = self.to_string(&self.expr(a, context));
                let prefix = self.to_string(&self.expr(b, context));
                Value::Bool(haystack.starts_with(&prefix))
            }
            Expr::Count(path) => Value::Num(self.path(path, context.item).len() as f64),
            Expr::Position => Value::Num(context.position as f64),
            Expr::Last => Value::Num(context.size as f64),
        }
    }

    fn compare(&self, op: CompareOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Nodes(a), Value::Nodes(b)) => a.iter().any(|x| {
                let x = self.string_of(x);
                b.iter().any(|y| op.strings(&x, &self.string_of(y)))
            }),
            (Value::Nodes(a), Value::Bool(b)) | (Value::Bool(b), Value::Nodes(a)) => {
                op.bools(!a.is_empty(), *b)
            }
            (Value::Nodes(a), Value::Num(n)) | (Value::Num(n), Value::Nodes(a)) => a
                .iter()
                .any(|x| op.numbers(parse_number(&self.string_of(x)), *n)),
            (Value::Nodes(a), Value::Str(s)) | (Value::Str(s), Value::Nodes(a)) => {
                a.iter().any(|x| op.strings(&self.string_of(x), s))
            }
            (l, r) => {
                if matches!(l, Value::Bool(_)) || matches!(r, Value::Bool(_)) {
                    op.bools(truthy(l), truthy(r))
                } else if matches!(l, Value::Num(_)) || matches!(r, Value::Num(_)) {
                    op.numbers(
                        parse_number(&self.to_string(l)),
                        parse_number(&self.to_string(r)),
                    )
                } else {
                    op.strings(&self.to_string(l), &self.to_string(r))
                }
            }
        }
    }
}

impl CompareOp {
    fn strings(self, a: &str, b: &str) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
        }
    }

    fn numbers(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
        }
    }

    fn bools(self, a: bool, b: bool) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Nodes(items) => !items.is_empty(),
        Value::Str(s) => !s.is_empty(),
        Value::Num(n) => *n != 0.0 && !n.is_nan(),
        Value::Bool(b) => *b,
    }
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
