//! Error-tolerant, pull-based HTML tokenizer.
//!
//! The tokenizer walks a cursor over an immutable input string and hands out
//! one [`Node`] per call. It never fails: a `<` that does not start a valid
//! tag is re-read as the text `&lt;`, which guarantees forward progress on
//! arbitrarily broken markup.
//!
//! Known limitations (intentional):
//! - A tag must fit on one line; a newline inside a tag makes it invalid.
//! - Attribute values must be quoted. `name=value` is invalid, bare `name`
//!   is a boolean attribute whose value is its own name.
//! - `<!DOCTYPE` is matched case-sensitively.
//! - Closing tags must match the innermost open tag, otherwise they are text.

use std::borrow::Cow;
use std::iter::FusedIterator;

use memchr::{memchr, memmem};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{is_block_element, is_preformatted_element, is_void_element};
use crate::node::{Attributes, Node, Tag, Text};

const PI_START: &str = "<?";
const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const DOCTYPE_START: &str = "<!DOCTYPE";
const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

// Runs that actually change when collapsed; a lone space is left alone so
// ordinary text stays borrowed.
static COLLAPSIBLE_WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\t\r\n\x0C][ \t\r\n\x0C]*| [ \t\r\n\x0C]+").expect("whitespace pattern is valid")
});

/// Why a `<` did not start a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagError {
    EmptyName,
    UnterminatedLine,
    UnquotedValue,
    UnexpectedByte(u8),
    ClosingWithAttributes,
    Mismatched,
}

/// Collapse whitespace runs to a single space.
pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    COLLAPSIBLE_WHITESPACE.replace_all(text, " ")
}

fn is_attribute_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':' | b'.')
}

/// Incremental tokenizer over a borrowed HTML string.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    open_tags: Vec<String>,
    preformatted_depth: usize,
    /// Opening tag returned by the previous call, pushed on the next one
    pending_open: Option<String>,
    /// Drop the next text node if it collapses to a single space
    skip_whitespace: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open_tags: Vec::new(),
            preformatted_depth: 0,
            pending_open: None,
            skip_whitespace: true,
        }
    }

    /// The full input, including the consumed part
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Byte offset of the cursor
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_finished(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Names of currently open tags, outermost first
    pub fn open_tags(&self) -> &[String] {
        &self.open_tags
    }

    pub fn depth(&self) -> usize {
        self.open_tags.len()
    }

    /// Number of open `pre`, `code`, `script` and `style` tags
    pub fn preformatted_depth(&self) -> usize {
        self.preformatted_depth
    }

    pub fn keeps_whitespace(&self) -> bool {
        self.preformatted_depth > 0
    }

    /// Produce the next node, or `None` once the input is exhausted.
    pub fn next_node(&mut self) -> Option<Node<'a>> {
        loop {
            if self.is_finished() {
                return None;
            }
            self.push_pending_open();

            let rest = self.rest();
            if rest.starts_with(PI_START) {
                return Some(self.processing_instruction());
            }
            if rest.starts_with(COMMENT_START) {
                return Some(self.comment());
            }
            if rest.starts_with(DOCTYPE_START) {
                return Some(self.doctype());
            }
            if rest.starts_with(CDATA_START) {
                return Some(self.cdata());
            }

            let mut recovered = false;
            if rest.starts_with('<') {
                match self.parse_tag() {
                    Ok(tag) => {
                        log::trace!("tag <{}{}> at {}", tag.closing_prefix(), tag.name, tag.span.start);
                        self.skip_whitespace = tag.block == Some(true);
                        return Some(Node::Tag(tag));
                    }
                    Err(err) => {
                        // Recovery: read the `<` as `&lt;` and continue as text.
                        log::debug!(
                            "invalid tag at byte {} ({:?}), escaping it as text",
                            self.pos,
                            err
                        );
                        recovered = true;
                    }
                }
            }

            if let Some(text) = self.text(recovered) {
                return Some(Node::Text(text));
            }
            // Formatting whitespace between tags was dropped; go again.
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let input = self.input;
        let start = self.pos;
        self.pos = (start + len).min(input.len());
        &input[start..self.pos]
    }

    fn push_pending_open(&mut self) {
        if let Some(name) = self.pending_open.take() {
            if is_preformatted_element(&name) {
                self.preformatted_depth += 1;
            }
            self.open_tags.push(name);
        }
    }

    /// Length up to and including the next `>`, or the whole rest.
    fn through_gt(&self) -> usize {
        let rest = self.rest().as_bytes();
        memchr(b'>', rest).map_or(rest.len(), |i| i + 1)
    }

    fn processing_instruction(&mut self) -> Node<'a> {
        let len = self.through_gt();
        self.skip_whitespace = true;
        Node::ProcessingInstruction { raw: self.advance(len) }
    }

    fn comment(&mut self) -> Node<'a> {
        let rest = self.rest().as_bytes();
        let len = match memmem::find(rest, COMMENT_END.as_bytes()) {
            Some(i) => i + COMMENT_END.len(),
            // No `-->`: end at the next `>` like browsers of old did.
            None => self.through_gt(),
        };
        self.skip_whitespace = true;
        Node::Comment { raw: self.advance(len) }
    }

    fn doctype(&mut self) -> Node<'a> {
        let len = self.through_gt();
        self.skip_whitespace = true;
        Node::Doctype { raw: self.advance(len) }
    }

    fn cdata(&mut self) -> Node<'a> {
        let rest = self.rest();
        let body = &rest[CDATA_START.len()..];
        let (body, len) = match memmem::find(body.as_bytes(), CDATA_END.as_bytes()) {
            Some(i) => (&body[..i], CDATA_START.len() + i + CDATA_END.len()),
            None => (body, rest.len()),
        };
        let text = if self.keeps_whitespace() {
            Cow::Borrowed(body)
        } else {
            collapse_whitespace(body)
        };
        self.skip_whitespace = true;
        let raw = self.advance(len);
        Node::Text(Text { raw, text })
    }

    /// Text up to the next `<`. With `recovered`, the current `<` belongs to
    /// the text and is written as `&lt;`. Returns `None` when the text is
    /// formatting whitespace that should be dropped.
    fn text(&mut self, recovered: bool) -> Option<Text<'a>> {
        let input = self.input;
        let start = self.pos;
        let body_start = if recovered { start + 1 } else { start };
        let end = memchr(b'<', &input.as_bytes()[body_start..]).map_or(input.len(), |i| body_start + i);
        self.pos = end;

        let raw = &input[start..end];
        let body = &input[body_start..end];
        let keep = self.keeps_whitespace();
        let mut text = if keep {
            Cow::Borrowed(body)
        } else {
            collapse_whitespace(body)
        };
        if recovered {
            text = Cow::Owned(format!("&lt;{text}"));
        }

        if keep {
            self.skip_whitespace = false;
        }
        if self.skip_whitespace && text == " " {
            return None;
        }
        self.skip_whitespace = false;
        Some(Text { raw, text })
    }

    /// Parse the tag at the cursor. On success the cursor moves past it and
    /// the open-tag stack is updated; on failure nothing changes.
    fn parse_tag(&mut self) -> Result<Tag<'a>, TagError> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        // Tag definitions must be on one line.
        let line_end = memchr(b'\n', &bytes[start..]).map_or(bytes.len(), |i| start + i);
        let at = |pos: usize| if pos < line_end { Some(bytes[pos]) } else { None };

        let mut pos = start + 1;
        let is_opening = at(pos) != Some(b'/');
        if !is_opening {
            pos += 1;
        }

        let name_start = pos;
        if at(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
            pos += 1;
            while at(pos).is_some_and(|b| b.is_ascii_alphanumeric()) {
                pos += 1;
            }
        }
        if pos == name_start {
            return Err(TagError::EmptyName);
        }
        let name = input[name_start..pos].to_ascii_lowercase();

        let mut attributes = Attributes::new();
        let mut self_closing = false;
        loop {
            match at(pos) {
                None => return Err(TagError::UnterminatedLine),
                Some(b'>') => {
                    pos += 1;
                    break;
                }
                Some(b'/') if at(pos + 1) == Some(b'>') => {
                    self_closing = true;
                    pos += 2;
                    break;
                }
                Some(b' ' | b'\t' | b'\r') => pos += 1,
                Some(b) if b.is_ascii_alphabetic() => {
                    let attr_start = pos;
                    while at(pos).is_some_and(is_attribute_name_byte) {
                        pos += 1;
                    }
                    let attr_name = input[attr_start..pos].to_ascii_lowercase();
                    let value = if at(pos) == Some(b'=') {
                        let quote = match at(pos + 1) {
                            Some(q @ (b'"' | b'\'')) => q,
                            _ => return Err(TagError::UnquotedValue),
                        };
                        let value_start = pos + 2;
                        let value_end = memchr(quote, &bytes[value_start..line_end])
                            .map(|i| value_start + i)
                            .ok_or(TagError::UnterminatedLine)?;
                        pos = value_end + 1;
                        input[value_start..value_end].to_string()
                    } else {
                        // HTML 4 shorthand: <option selected>
                        attr_name.clone()
                    };
                    attributes.insert(attr_name, value);
                }
                Some(b) => return Err(TagError::UnexpectedByte(b)),
            }
        }

        if !is_opening {
            if !attributes.is_empty() {
                return Err(TagError::ClosingWithAttributes);
            }
            if self.open_tags.last() != Some(&name) {
                return Err(TagError::Mismatched);
            }
            self.open_tags.pop();
            if is_preformatted_element(&name) {
                self.preformatted_depth = self.preformatted_depth.saturating_sub(1);
            }
        }

        let is_void = self_closing || is_void_element(&name);
        if is_opening && !is_void {
            self.pending_open = Some(name.clone());
        }
        self.pos = pos;

        Ok(Tag {
            block: is_block_element(&name),
            name,
            attributes,
            is_opening,
            is_void,
            raw: &input[start..pos],
            span: start..pos,
        })
    }
}

impl Tag<'_> {
    fn closing_prefix(&self) -> &'static str {
        if self.is_opening {
            ""
        } else {
            "/"
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node()
    }
}

impl FusedIterator for Tokenizer<'_> {}
