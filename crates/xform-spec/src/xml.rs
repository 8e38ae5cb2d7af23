//! Minimal labelled XML tree and its indented text rendering.
//!
//! The tree never escapes on output: whoever builds a node is responsible for
//! passing already-escaped attribute values and text (see [`escape`]).

use std::borrow::Cow;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::XFormError;

const INDENT: &str = "  ";

/// Attributes kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an existing value in place so ordering stays stable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of attribute names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut attrs = Attributes::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    attrs.set(key, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// What a node holds besides its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    /// Rendered as a self-closing tag.
    Empty,
    Text(String),
    /// Rendered as an opening tag, one line per child, and a closing tag; an
    /// empty list still renders both tags.
    Children(Vec<XmlNode>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct XmlNode {
    pub name: String,
    pub attrs: Attributes,
    pub content: XmlContent,
}

impl XmlNode {
    /// A node with neither text nor children.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            content: XmlContent::Empty,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            content: XmlContent::Text(value.into()),
        }
    }

    pub fn parent(name: impl Into<String>, children: Vec<XmlNode>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            content: XmlContent::Children(children),
        }
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn value(&self) -> Option<&str> {
        match &self.content {
            XmlContent::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> &[XmlNode] {
        match &self.content {
            XmlContent::Children(children) => children,
            _ => &[],
        }
    }

    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children().iter().find(|child| child.name == name)
    }

    /// Follows a chain of direct child names.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter()
            .try_fold(self, |node, segment| node.child(segment))
    }
}

impl fmt::Display for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, 0)
    }
}

/// JSON shape of a node: `{name, attrs?, val?, children?}`.
#[derive(Serialize, Deserialize)]
struct RawNode {
    name: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    attrs: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    val: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<XmlNode>>,
}

impl TryFrom<RawNode> for XmlNode {
    type Error = XFormError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let content = match (raw.val, raw.children) {
            (Some(_), Some(_)) => return Err(XFormError::Node(raw.name)),
            (Some(value), None) => XmlContent::Text(value),
            (None, Some(children)) => XmlContent::Children(children),
            (None, None) => XmlContent::Empty,
        };
        Ok(Self {
            name: raw.name,
            attrs: raw.attrs,
            content,
        })
    }
}

impl From<XmlNode> for RawNode {
    fn from(node: XmlNode) -> Self {
        let (val, children) = match node.content {
            XmlContent::Empty => (None, None),
            XmlContent::Text(value) => (Some(value), None),
            XmlContent::Children(children) => (None, Some(children)),
        };
        Self {
            name: node.name,
            attrs: node.attrs,
            val,
            children,
        }
    }
}

/// Renders `node` as indented XML, two spaces per level, one element per line.
pub fn serialize(node: &XmlNode) -> String {
    node.to_string()
}

fn write_node<W: fmt::Write>(out: &mut W, node: &XmlNode, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    write!(out, "<{}", node.name)?;
    for (key, value) in node.attrs.iter() {
        write!(out, " {}=\"{}\"", key, value)?;
    }

    match &node.content {
        XmlContent::Empty => out.write_str("/>\n"),
        XmlContent::Text(value) => writeln!(out, ">{}</{}>", value, node.name),
        XmlContent::Children(children) => {
            out.write_str(">\n")?;
            for child in children {
                write_node(out, child, depth + 1)?;
            }
            for _ in 0..depth {
                out.write_str(INDENT)?;
            }
            writeln!(out, "</{}>", node.name)
        }
    }
}

/// Escapes the characters XML reserves in text and double-quoted attributes.
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_attribute_in_place() {
        let mut attrs = Attributes::new();
        attrs.set("a", "1");
        attrs.set("b", "2");
        attrs.set("a", "3");
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(attrs.get("a"), Some("3"));
    }

    #[test]
    fn escape_leaves_plain_text_borrowed() {
        assert!(matches!(escape(". != 'x'"), Cow::Borrowed(_)));
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn descend_follows_child_names() {
        let tree = XmlNode::parent(
            "a",
            vec![XmlNode::parent("b", vec![XmlNode::text("c", "found")])],
        );
        assert_eq!(
            tree.descend(&["b", "c"]).and_then(XmlNode::value),
            Some("found")
        );
        assert!(tree.descend(&["b", "missing"]).is_none());
    }

    struct Refusing;

    impl fmt::Write for Refusing {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn write_errors_propagate() {
        let node = XmlNode::parent("a", vec![XmlNode::empty("b")]);
        assert_eq!(write_node(&mut Refusing, &node, 0), Err(fmt::Error));
    }

    #[test]
    fn display_matches_serialize() {
        let node = XmlNode::parent("a", vec![XmlNode::text("b", "x").attr("k", "v")]);
        assert_eq!(format!("{}", node), "<a>\n  <b k=\"v\">x</b>\n</a>\n");
        assert_eq!(serialize(&node), node.to_string());
    }
}
