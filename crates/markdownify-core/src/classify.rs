//! Static element classification tables.
//!
//! Process-wide, read-only. Tag names are expected in lowercase, which is
//! what the tokenizer produces.

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "blockquote", "body", "caption", "center", "dd", "dir", "div", "dl", "dt",
    "fieldset", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "hr", "html", "isindex",
    "li", "menu", "meta", "noframes", "noscript", "ol", "p", "pre", "style", "table", "tbody",
    "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Inline HTML elements
pub const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "applet", "b", "basefont", "bdo", "big", "br", "button", "cite",
    "code", "del", "dfn", "em", "font", "i", "iframe", "img", "input", "ins", "kbd", "label",
    "map", "object", "q", "samp", "script", "select", "small", "span", "strong", "sub", "sup",
    "textarea", "tt", "var",
];

/// Elements that never have content or a closing tag
pub const VOID_ELEMENTS: &[&str] = &["br", "hr", "input", "img"];

/// Elements whose text content keeps its whitespace
pub const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "code", "script", "style"];

/// Block classification of a tag name.
///
/// `Some(true)` for block elements, `Some(false)` for inline elements and
/// `None` when the name is not in either table. Callers decide what an
/// unknown element means; it is neither "definitely block" nor
/// "definitely inline".
pub fn is_block_element(tag: &str) -> Option<bool> {
    if BLOCK_ELEMENTS.contains(&tag) {
        Some(true)
    } else if INLINE_ELEMENTS.contains(&tag) {
        Some(false)
    } else {
        None
    }
}

/// Check if a tag is a void element
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Check if a tag opens a preformatted region
pub fn is_preformatted_element(tag: &str) -> bool {
    PREFORMATTED_ELEMENTS.contains(&tag)
}
