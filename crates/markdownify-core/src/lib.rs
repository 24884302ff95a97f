//! markdownify-core - HTML tokenizer and element classification
//!
//! This crate is the Markdown-agnostic half of `markdownify`. It turns an
//! HTML string into a stream of [`Node`]s, one per call, and answers static
//! questions about element names (block or inline, void, preformatted).
//!
//! # Architecture
//!
//! ```text
//! HTML &str ──▶ Tokenizer ──Node──▶ Engine (markdownify) ──▶ Markdown String
//!                   │
//!                   └──Node──▶ indent_html ──▶ indented HTML
//! ```
//!
//! # Example
//!
//! ```rust
//! use markdownify_core::{Node, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::new(r#"<p class="intro">Hello <b>World</b></p>"#);
//!
//! let Some(Node::Tag(p)) = tokenizer.next_node() else { unreachable!() };
//! assert_eq!(p.name, "p");
//! assert_eq!(p.attr("class"), Some("intro"));
//! assert_eq!(p.block, Some(true));
//!
//! assert_eq!(tokenizer.next_node().unwrap().as_text(), Some("Hello "));
//! assert_eq!(tokenizer.open_tags(), ["p"]);
//! ```

mod classify;
mod entities;
mod indent;
mod node;
mod tokenizer;

pub use classify::{
    is_block_element, is_preformatted_element, is_void_element, BLOCK_ELEMENTS, INLINE_ELEMENTS,
    PREFORMATTED_ELEMENTS, VOID_ELEMENTS,
};
pub use entities::{decode_entities, lookup_entity};
pub use indent::indent_html;
pub use node::{Attributes, Node, NodeKind, Tag, Text};
pub use tokenizer::{collapse_whitespace, Tokenizer};
