//! Open elements on the engine's stack.

use markdownify_core::{Attributes, Tag};

/// Column alignment of a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// A finished table cell: single-line Markdown with `|` escaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub content: String,
    /// Written as `th`
    pub header: bool,
    pub alignment: Alignment,
}

/// A finished table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// The row sat inside `thead`
    pub in_head: bool,
}

/// Rows collected while a `table` is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    pub rows: Vec<TableRow>,
    pub caption: Option<String>,
}

/// Per-element state that survives until the element closes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FrameContext {
    #[default]
    None,
    /// `ul` / `ol`; `next` is the number of the next ordered item
    List { ordered: bool, next: u32 },
    /// `li`, with the marker chosen when it opened (`*   `, `12. `)
    ListItem { marker: String },
    /// `pre`; the language is read from an inner `code` class
    Pre { language: Option<String> },
    Table(TableState),
    /// `tr`; `header` when inside `thead`
    Row { cells: Vec<TableCell>, header: bool },
    DefinitionList { after_definition: bool },
    /// Content is dropped
    Removed,
    /// Emitted as the original HTML
    Kept,
}

/// An open element and the Markdown rendered for its content so far.
#[derive(Debug, Clone)]
pub struct Frame {
    tag: String,
    attributes: Attributes,
    raw_open: String,
    span_start: usize,
    block: bool,
    in_code: bool,
    prefix_width: usize,
    pub(crate) buffer: String,
    /// Start of the inline run not yet flushed into `buffer`
    pub(crate) inline_start: Option<usize>,
    pub(crate) context: FrameContext,
}

impl Frame {
    pub(crate) fn root() -> Self {
        Self {
            tag: "$root".to_string(),
            attributes: Attributes::new(),
            raw_open: String::new(),
            span_start: 0,
            block: true,
            in_code: false,
            prefix_width: 0,
            buffer: String::new(),
            inline_start: None,
            context: FrameContext::None,
        }
    }

    /// Frame for `tag` opened inside `parent`.
    pub(crate) fn open(tag: &Tag<'_>, block: bool, parent: &Frame) -> Self {
        let context = if parent.is_discarding() {
            FrameContext::Removed
        } else {
            FrameContext::None
        };
        Self {
            tag: tag.name.clone(),
            attributes: tag.attributes.clone(),
            raw_open: tag.raw.to_string(),
            span_start: tag.span.start,
            block,
            in_code: parent.in_code || matches!(tag.name.as_str(), "pre" | "code"),
            prefix_width: parent.prefix_width,
            buffer: String::new(),
            inline_start: None,
            context,
        }
    }

    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The opening tag as written in the input
    pub fn raw_open(&self) -> &str {
        &self.raw_open
    }

    /// Byte offset of the opening tag in the input
    pub fn span_start(&self) -> usize {
        self.span_start
    }

    pub fn is_block(&self) -> bool {
        self.block
    }

    /// Inside `pre` or `code`, itself included
    pub fn in_code(&self) -> bool {
        self.in_code
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub(crate) fn is_root(&self) -> bool {
        self.tag == "$root"
    }

    pub(crate) fn is_discarding(&self) -> bool {
        matches!(self.context, FrameContext::Removed | FrameContext::Kept)
    }

    /// Columns taken by quote and list prefixes around this frame's lines
    pub(crate) fn prefix_width(&self) -> usize {
        self.prefix_width
    }

    pub(crate) fn indent_by(&mut self, width: usize) {
        self.prefix_width += width;
    }

    /// Append inline Markdown. A block frame's run starts at the first
    /// non-blank piece.
    pub(crate) fn push_inline(&mut self, markdown: &str) {
        if !self.block || self.inline_start.is_some() {
            self.buffer.push_str(markdown);
            return;
        }
        let markdown = markdown.trim_start();
        if markdown.is_empty() {
            return;
        }
        self.inline_start = Some(self.buffer.len());
        self.buffer.push_str(markdown);
    }

    /// Detach the pending inline run, if any.
    pub(crate) fn take_run(&mut self) -> Option<String> {
        self.inline_start
            .take()
            .map(|start| self.buffer.split_off(start))
    }
}
