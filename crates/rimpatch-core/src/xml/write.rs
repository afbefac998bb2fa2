//! [`XmlNode`] to XML text

use super::node::XmlNode;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

pub const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

impl XmlNode {
    /// Serialize without any added whitespace
    pub fn to_compact_string(&self) -> String {
        let mut out = String::new();
        write_compact(self, &mut out);
        out
    }

    /// Serialize with two-space indentation
    ///
    /// Elements holding text are kept on one line so that no whitespace is
    /// introduced into text content.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        write_pretty(self, 0, &mut out);
        out
    }

    /// Hex SHA-256 of the compact serialization
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_compact_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn write_compact(node: &XmlNode, out: &mut String) {
    match node {
        XmlNode::Text(t) => escape_text(t, out),
        XmlNode::Element {
            name,
            attributes,
            children,
        } => {
            open_tag(name, attributes, children.is_empty(), out);
            if !children.is_empty() {
                for child in children {
                    write_compact(child, out);
                }
                let _ = write!(out, "</{}>", name);
            }
        }
    }
}

fn write_pretty(node: &XmlNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        XmlNode::Text(t) => {
            out.push_str(&indent);
            escape_text(t, out);
            out.push('\n');
        }
        XmlNode::Element { children, .. }
            if children.iter().any(|c| matches!(c, XmlNode::Text(_))) =>
        {
            out.push_str(&indent);
            write_compact(node, out);
            out.push('\n');
        }
        XmlNode::Element {
            name,
            attributes,
            children,
        } => {
            out.push_str(&indent);
            open_tag(name, attributes, children.is_empty(), out);
            out.push('\n');
            if !children.is_empty() {
                for child in children {
                    write_pretty(child, depth + 1, out);
                }
                let _ = writeln!(out, "{}</{}>", indent, name);
            }
        }
    }
}

fn open_tag(name: &str, attributes: &[(String, String)], empty: bool, out: &mut String) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }
    out.push_str(if empty { "/>" } else { ">" });
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
}
