//! # markdownify
//!
//! Convert HTML strings to Markdown.
//!
//! The input is read by the [`markdownify_core`] tokenizer one node at a
//! time; there is no DOM. Open elements live on a stack of [`Frame`]s, and
//! each element is rendered through a [`Rule`] when it closes.
//!
//! ## Design
//!
//! - **Never fails on markup**: malformed tags turn into literal text and
//!   unclosed elements are closed at the end of the input.
//! - **Rules are data**: the CommonMark and Markdown Extra renderings are
//!   ordinary [`Rule`]s, and custom rules take precedence over them.
//! - **Independent calls**: every conversion has its own tokenizer and
//!   engine state, so one [`Markdownify`] can be shared across threads.
//!
//! ## Example
//!
//! ```rust
//! use markdownify::Markdownify;
//!
//! let service = Markdownify::new();
//! let markdown = service.convert("<h1>Hello World</h1><p>Some <strong>bold</strong> text</p>");
//! assert_eq!(markdown, "# Hello World\n\nSome **bold** text");
//! ```
//!
//! ## Example (Markdown Extra)
//!
//! ```rust
//! use markdownify::{convert, Options};
//!
//! let options = Options {
//!     enable_extra_syntax: true,
//!     ..Default::default()
//! };
//! let markdown = convert("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>", &options);
//! assert_eq!(markdown, "| A   | B   |\n| --- | --- |\n| 1   | 2   |");
//! ```

mod engine;
mod frame;
mod options;
mod references;
mod rules;
mod service;
mod utilities;

pub use frame::{Alignment, Frame, FrameContext, TableCell, TableRow, TableState};
pub use markdownify_core::indent_html;
pub use options::{CodeBlockStyle, HeadingStyle, LinkStyle, Options, UnknownTagPolicy};
pub use rules::{Filter, PredicateFn, ReplacementFn, Rule, RuleContext, Rules};
pub use service::{convert, Markdownify};
pub use utilities::*;

/// Error type for markdownify operations
#[derive(Debug, thiserror::Error)]
pub enum MarkdownifyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, MarkdownifyError>;
