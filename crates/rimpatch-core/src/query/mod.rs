//! Restricted path queries over the working document
//!
//! A [`Query`] is classified once, at parse time, by its trailing syntax:
//!
//! - `.../text()` selects the parent elements of matching text nodes
//! - `.../@name` selects `(element, attribute)` pairs
//! - anything else selects elements
//!
//! Relative query strings are made absolute by prefixing `/`.

mod eval;
mod syntax;

use crate::errors::{PatchError, Result};
use crate::xml::{Document, NodeId};
use eval::{Evaluator, Item};
use std::collections::HashSet;
use std::fmt;
use syntax::{Axis, LocationPath, NodeTest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Element,
    Attribute,
    Text,
}

/// An element whose named attribute was selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub element: NodeId,
    pub name: String,
    pub value: String,
}

/// An element whose text content was selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub element: NodeId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    paths: Vec<LocationPath>,
    kind: QueryKind,
}

impl Query {
    /// Parse and classify a query string
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` for empty strings, syntax outside the supported
    /// subset, `text()` or `@name` before the last step, a nameless attribute
    /// selection, or a union mixing kinds.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PatchError::InvalidQuery {
                query: text.to_string(),
                reason: "empty query".to_string(),
            });
        }
        let source = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };

        let paths = syntax::parse_union(&source)?;
        let mut kinds = paths.iter().map(|p| classify(&source, p));
        let kind = kinds.next().unwrap_or(Ok(QueryKind::Element))?;
        for other in kinds {
            if other? != kind {
                return Err(PatchError::InvalidQuery {
                    query: source.clone(),
                    reason: "union mixes element, attribute and text selections".to_string(),
                });
            }
        }

        Ok(Self {
            source,
            paths,
            kind,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    fn select(&self, doc: &Document) -> Vec<Item> {
        Evaluator::new(doc).select(&self.paths)
    }

    fn shape_error(&self, reason: &str) -> PatchError {
        PatchError::QueryShape {
            query: self.source.clone(),
            reason: reason.to_string(),
        }
    }

    /// Elements selected by the query, in document order
    ///
    /// For text and attribute queries these are the owning elements.
    ///
    /// # Errors
    ///
    /// Returns `QueryShape` if an element query selects anything that is not
    /// an element, such as the document node.
    pub fn elements(&self, doc: &Document) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for item in self.select(doc) {
            let element = match (self.kind, item) {
                (QueryKind::Element, Item::Node(id)) if doc.is_element(id) => id,
                (QueryKind::Attribute, Item::Attribute(owner, _)) => owner,
                (QueryKind::Text, Item::Node(id)) => doc
                    .element_parent(id)
                    .ok_or_else(|| self.shape_error("text node without element parent"))?,
                _ => return Err(self.shape_error("expected only elements")),
            };
            // Text parents can repeat out of order, e.g. a, b, a for `<a>t<b>t</b>t</a>`
            if seen.insert(element) {
                out.push(element);
            }
        }
        Ok(out)
    }

    /// Selected attributes with their current values
    ///
    /// # Errors
    ///
    /// Returns `QueryShape` if this is not an attribute query.
    pub fn attributes(&self, doc: &Document) -> Result<Vec<AttributeMatch>> {
        if self.kind != QueryKind::Attribute {
            return Err(self.shape_error("not an attribute query"));
        }
        Ok(self
            .select(doc)
            .into_iter()
            .filter_map(|item| match item {
                Item::Attribute(owner, index) => {
                    doc.attributes(owner).get(index).map(|(k, v)| AttributeMatch {
                        element: owner,
                        name: k.clone(),
                        value: v.clone(),
                    })
                }
                Item::Node(_) => None,
            })
            .collect())
    }

    /// Parents of the selected text nodes with their text content
    ///
    /// # Errors
    ///
    /// Returns `QueryShape` if this is not a text query.
    pub fn texts(&self, doc: &Document) -> Result<Vec<TextMatch>> {
        if self.kind != QueryKind::Text {
            return Err(self.shape_error("not a text query"));
        }
        Ok(self
            .elements(doc)?
            .into_iter()
            .map(|element| TextMatch {
                element,
                text: doc.text(element).unwrap_or_default(),
            })
            .collect())
    }

    /// Whether the query selects anything
    ///
    /// # Errors
    ///
    /// Returns `QueryShape` under the same conditions as [`Query::elements`].
    pub fn matches(&self, doc: &Document) -> Result<bool> {
        Ok(!self.elements(doc)?.is_empty())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn classify(source: &str, path: &LocationPath) -> Result<QueryKind> {
    match path.steps.last() {
        Some(step) if step.axis == Axis::Attribute => match step.test {
            NodeTest::Name(_) => Ok(QueryKind::Attribute),
            _ => Err(PatchError::InvalidQuery {
                query: source.to_string(),
                reason: "attribute selection needs a name".to_string(),
            }),
        },
        Some(step) if step.test == NodeTest::Text => Ok(QueryKind::Text),
        _ => Ok(QueryKind::Element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlNode;

    fn doc() -> Document {
        Document::from_node(
            &XmlNode::parse(
                r#"<Defs>
                    <ThingDef Name="Base" Abstract="True"><label>base</label></ThingDef>
                    <ThingDef ParentName="Base"><defName>Wall</defName><label>wall</label></ThingDef>
                    <ThingDef><defName>Door</defName><stuff><li>Wood</li><li>Steel</li></stuff></ThingDef>
                </Defs>"#,
            )
            .unwrap(),
        )
    }

    fn labels(doc: &Document, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|id| doc.string_value(*id)).collect()
    }

    #[test]
    fn test_relative_query_is_made_absolute() {
        let query = Query::parse("Defs/ThingDef").unwrap();
        assert_eq!(query.as_str(), "/Defs/ThingDef");
        assert_eq!(query.elements(&doc()).unwrap().len(), 3);
    }

    #[test]
    fn test_kind_is_chosen_from_trailing_syntax() {
        assert_eq!(Query::parse("/Defs/a").unwrap().kind(), QueryKind::Element);
        assert_eq!(Query::parse("/Defs/a/@b").unwrap().kind(), QueryKind::Attribute);
        assert_eq!(Query::parse("/Defs/a/text()").unwrap().kind(), QueryKind::Text);
    }

    #[test]
    fn test_mixed_union_is_invalid() {
        let err = Query::parse("/Defs/a | /Defs/a/@b").unwrap_err();
        assert!(matches!(err, PatchError::InvalidQuery { .. }));
    }

    #[test]
    fn test_predicate_on_child_text() {
        let doc = doc();
        let found = Query::parse("/Defs/ThingDef[defName=\"Wall\"]/label")
            .unwrap()
            .elements(&doc)
            .unwrap();
        assert_eq!(labels(&doc, &found), vec!["wall"]);
    }

    #[test]
    fn test_descendant_and_positional_predicates() {
        let doc = doc();
        let first = Query::parse("//stuff/li[1]").unwrap().elements(&doc).unwrap();
        assert_eq!(labels(&doc, &first), vec!["Wood"]);
        let last = Query::parse("//li[position()=last()]")
            .unwrap()
            .elements(&doc)
            .unwrap();
        assert_eq!(labels(&doc, &last), vec!["Steel"]);
    }

    #[test]
    fn test_attribute_query_returns_values() {
        let doc = doc();
        let found = Query::parse("/Defs/ThingDef/@Name")
            .unwrap()
            .attributes(&doc)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Name");
        assert_eq!(found[0].value, "Base");
    }

    #[test]
    fn test_text_query_resolves_to_parents() {
        let doc = doc();
        let found = Query::parse("/Defs/ThingDef/defName/text()")
            .unwrap()
            .texts(&doc)
            .unwrap();
        let texts: Vec<_> = found.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Wall", "Door"]);
        assert!(found.iter().all(|t| doc.name(t.element) == Some("defName")));
    }

    #[test]
    fn test_functions_and_boolean_logic() {
        let doc = doc();
        let q = |s: &str| Query::parse(s).unwrap().elements(&doc).unwrap().len();
        assert_eq!(q("/Defs/ThingDef[not(@Abstract)]"), 2);
        assert_eq!(q("/Defs/ThingDef[contains(defName, 'oo')]"), 1);
        assert_eq!(q("/Defs/ThingDef[starts-with(label, 'wa') or @Name='Base']"), 2);
        assert_eq!(q("/Defs/ThingDef[count(stuff/li)=2]"), 1);
        assert_eq!(q("/Defs/ThingDef[@ParentName!='Base']"), 0);
        assert_eq!(q("/Defs/*[label][defName]"), 1);
    }

    #[test]
    fn test_parent_and_self_steps() {
        let doc = doc();
        let found = Query::parse("/Defs/ThingDef/stuff/li/../.")
            .unwrap()
            .elements(&doc)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(doc.name(found[0]), Some("stuff"));
    }

    #[test]
    fn test_selecting_document_node_is_shape_error() {
        let err = Query::parse("/Defs/..").unwrap().elements(&doc()).unwrap_err();
        assert!(matches!(err, PatchError::QueryShape { .. }));
    }

    #[test]
    fn test_text_parents_are_deduplicated_out_of_order() {
        let doc = Document::from_node(&XmlNode::parse("<Defs><a>t1<b>t2</b>t3</a></Defs>").unwrap());
        let found = Query::parse("/Defs//text()").unwrap().elements(&doc).unwrap();
        let names: Vec<_> = found.iter().map(|id| doc.name(*id).unwrap()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_large_match_set_keeps_every_element_once() {
        let list = (0..50_000).fold(XmlNode::element("T"), |t, i| {
            t.with_child(XmlNode::element("li").with_text(i.to_string()))
        });
        let doc = Document::from_node(&XmlNode::element("Defs").with_child(list));

        let started = std::time::Instant::now();
        let found = Query::parse("/Defs/T/li").unwrap().elements(&doc).unwrap();

        assert_eq!(found.len(), 50_000);
        assert_eq!(doc.string_value(found[0]), "0");
        assert_eq!(doc.string_value(found[49_999]), "49999");
        // A scan-per-match dedup takes tens of seconds here in debug builds
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_union_is_in_document_order_without_duplicates() {
        let doc = doc();
        let found = Query::parse("//li[2] | //li | //li[1]")
            .unwrap()
            .elements(&doc)
            .unwrap();
        assert_eq!(labels(&doc, &found), vec!["Wood", "Steel"]);
    }
}
