//! Configuration options for HTML to Markdown conversion

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    #[default]
    Indented,
    /// Use fenced code blocks (```)
    Fenced,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use numbered reference links [text][1]
    Referenced,
}

/// Layout of tags the classifier does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Render in the surrounding text run
    #[default]
    Inline,
    /// Render as a block of its own
    Block,
}

/// Options for Markdown conversion
#[derive(Debug, Clone)]
pub struct Options {
    /// Column to wrap text at; 0 disables wrapping
    pub wrap_column: usize,

    /// Emit unknown tags as HTML around their converted content
    pub keep_html_for_unknown_tags: bool,

    /// Enable tables, definition lists, abbreviations and heading ids
    pub enable_extra_syntax: bool,

    /// Emit comments, doctypes and processing instructions verbatim
    pub pass_through_markup: bool,

    pub unknown_tag_policy: UnknownTagPolicy,

    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// With referenced links, emit definitions after each top-level block
    /// instead of at the end of the document
    pub links_after_each_paragraph: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            wrap_column: 0,
            keep_html_for_unknown_tags: false,
            enable_extra_syntax: false,
            pass_through_markup: false,
            unknown_tag_policy: UnknownTagPolicy::Inline,
            heading_style: HeadingStyle::Atx,
            hr: "* * *".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            links_after_each_paragraph: false,
        }
    }
}
