//! Nodes produced by the tokenizer.
//!
//! Every call to [`Tokenizer::next_node`](crate::Tokenizer::next_node) yields
//! exactly one [`Node`]. Tag-specific data lives in [`Tag`], so it can only be
//! reached when the node actually is a tag.

use std::borrow::Cow;
use std::ops::Range;

use indexmap::IndexMap;

/// Attribute map of a tag: lowercase names to literal (undecoded) values.
pub type Attributes = IndexMap<String, String>;

/// Node kinds, without payload. Handy for logging and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Tag,
    Text,
    Comment,
    Doctype,
    ProcessingInstruction,
}

/// A single lexical unit of the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// Opening, closing or self-closing tag
    Tag(Tag<'a>),
    /// Character data, including CDATA sections
    Text(Text<'a>),
    /// `<!-- ... -->`
    Comment { raw: &'a str },
    /// `<!DOCTYPE ...>`
    Doctype { raw: &'a str },
    /// `<? ... >`
    ProcessingInstruction { raw: &'a str },
}

impl<'a> Node<'a> {
    /// The exact slice of input consumed for this node, delimiters included.
    pub fn raw(&self) -> &'a str {
        match self {
            Node::Tag(tag) => tag.raw,
            Node::Text(text) => text.raw,
            Node::Comment { raw } | Node::Doctype { raw } | Node::ProcessingInstruction { raw } => {
                raw
            }
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Tag(_) => NodeKind::Tag,
            Node::Text(_) => NodeKind::Text,
            Node::Comment { .. } => NodeKind::Comment,
            Node::Doctype { .. } => NodeKind::Doctype,
            Node::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag<'a>> {
        match self {
            Node::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    /// True for tags the classifier knows to be block-level.
    pub fn is_block_tag(&self) -> bool {
        matches!(self, Node::Tag(tag) if tag.block == Some(true))
    }
}

/// A parsed tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag<'a> {
    /// Lowercased tag name
    pub name: String,
    /// Attributes; always empty for closing tags
    pub attributes: Attributes,
    /// True for `<a>` and `<br/>`, false for `</a>`
    pub is_opening: bool,
    /// Self-closed, or one of the fixed void elements
    pub is_void: bool,
    /// Block classification; `None` when the tag name is unknown
    pub block: Option<bool>,
    /// Original tag text, `<` through `>`
    pub raw: &'a str,
    /// Byte range of `raw` within the tokenizer input
    pub span: Range<usize>,
}

impl Tag<'_> {
    pub fn is_closing(&self) -> bool {
        !self.is_opening
    }

    /// Get an attribute value by (lowercase) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Character data.
#[derive(Debug, Clone, PartialEq)]
pub struct Text<'a> {
    /// Consumed input slice
    pub raw: &'a str,
    /// Processed content: whitespace collapsed outside preformatted regions,
    /// CDATA delimiters stripped, recovered `<` written as `&lt;`
    pub text: Cow<'a, str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, attrs: &[(&str, &str)]) -> Tag<'static> {
        Tag {
            name: name.to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            is_opening: true,
            is_void: false,
            block: None,
            raw: "<x>",
            span: 0..3,
        }
    }

    #[test]
    fn test_raw_for_every_kind() {
        let comment = Node::Comment { raw: "<!-- c -->" };
        assert_eq!(comment.raw(), "<!-- c -->");
        assert_eq!(comment.kind(), NodeKind::Comment);

        let text = Node::Text(Text {
            raw: "a  b",
            text: Cow::Owned("a b".to_string()),
        });
        assert_eq!(text.raw(), "a  b");
        assert_eq!(text.as_text(), Some("a b"));
        assert!(text.as_tag().is_none());
    }

    #[test]
    fn test_attributes() {
        let a = tag("a", &[("href", "https://example.com"), ("title", "Example")]);
        assert_eq!(a.attr("href"), Some("https://example.com"));
        assert_eq!(a.attr("title"), Some("Example"));
        assert_eq!(a.attr("class"), None);
        assert!(a.has_attr("href"));
        assert!(!a.is_closing());
    }

    #[test]
    fn test_is_block_tag() {
        let mut p = tag("p", &[]);
        p.block = Some(true);
        assert!(Node::Tag(p).is_block_tag());

        let unknown = tag("blink", &[]);
        assert!(!Node::Tag(unknown).is_block_tag());
    }
}
