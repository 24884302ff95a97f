//! The markup engine: pulls nodes from the tokenizer and renders Markdown
//! through a stack of open elements.

use std::cell::RefCell;

use markdownify_core::{is_block_element, Node, Tag, Tokenizer};

use crate::frame::{Frame, FrameContext, TableCell, TableRow, TableState};
use crate::options::{LinkStyle, Options, UnknownTagPolicy};
use crate::references::References;
use crate::rules::{
    bullet_marker, cell_alignment, is_sectioning, is_transparent, ordinal_marker, RuleContext, Rules,
};
use crate::utilities::{escape_line_starts, escape_markdown, join_block, wrap_text};

/// Elements whose content must stay on one line.
const SINGLE_LINE_ELEMENTS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "td", "th", "dt", "caption"];

fn is_single_line(tag: &str) -> bool {
    SINGLE_LINE_ELEMENTS.contains(&tag)
}

/// Join non-blank lines with single spaces.
fn single_line(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tidy an inline run: trim it, drop spaces after line breaks, wrap it and
/// escape line starts that would read as block syntax.
fn tidy_run(run: &str, width: usize) -> String {
    let lines: Vec<String> = run
        .trim()
        .split('\n')
        .map(|line| {
            let text = line.trim();
            if line.ends_with("  ") && !text.is_empty() {
                format!("{text}  ")
            } else {
                text.to_string()
            }
        })
        .collect();
    let joined = lines.join("\n");
    let wrapped = if width > 0 {
        wrap_text(&joined, width)
    } else {
        joined
    };
    escape_line_starts(&wrapped).into_owned()
}

/// Move a block frame's pending inline run into its buffer.
fn flush(frame: &mut Frame, options: &Options) {
    let Some(run) = frame.take_run() else {
        return;
    };
    let width = if options.wrap_column == 0 || is_single_line(frame.tag()) {
        0
    } else {
        options
            .wrap_column
            .saturating_sub(frame.prefix_width())
            .max(1)
    };
    let tidied = tidy_run(&run, width);
    frame.buffer.push_str(&tidied);
}

fn code_language(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}

pub(crate) struct Engine<'a> {
    input: &'a str,
    tokenizer: Tokenizer<'a>,
    options: &'a Options,
    rules: &'a Rules,
    stack: Vec<Frame>,
    references: RefCell<References>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(input: &'a str, options: &'a Options, rules: &'a Rules) -> Self {
        Self {
            input,
            tokenizer: Tokenizer::new(input),
            options,
            rules,
            stack: vec![Frame::root()],
            references: RefCell::new(References::default()),
        }
    }

    /// Convert the whole input.
    pub(crate) fn run(mut self) -> String {
        while let Some(node) = self.tokenizer.next_node() {
            match node {
                Node::Tag(tag) if tag.is_opening && tag.is_void => self.void_tag(&tag),
                Node::Tag(tag) if tag.is_opening => self.open_tag(&tag),
                Node::Tag(tag) => self.close_tag(&tag),
                Node::Text(text) => self.text(&text.text),
                Node::Comment { raw } => self.markup(raw, false),
                Node::Doctype { raw } | Node::ProcessingInstruction { raw } => self.markup(raw, true),
            }
        }
        self.finish()
    }

    fn current(&self) -> &Frame {
        self.stack.last().expect("root frame is never popped")
    }

    fn current_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("root frame is never popped")
    }

    fn is_block(&self, tag: &Tag<'_>) -> bool {
        tag.block.unwrap_or_else(|| {
            is_sectioning(&tag.name) || self.options.unknown_tag_policy == UnknownTagPolicy::Block
        })
    }

    fn open_tag(&mut self, tag: &Tag<'_>) {
        let block = self.is_block(tag);
        let parent = self.current();
        let mut frame = Frame::open(tag, block, parent);

        if !frame.is_discarding() && !parent.in_code() {
            if self.rules.should_remove(&frame, self.options) {
                frame.context = FrameContext::Removed;
            } else if self.rules.should_keep(&frame, self.options) {
                frame.context = FrameContext::Kept;
            }
        }
        if !frame.is_discarding() {
            self.open_context(&mut frame);
        }

        log::trace!("push <{}> at depth {}", frame.tag(), self.stack.len());
        self.stack.push(frame);
    }

    /// Set up per-element state, updating the parent where the new element
    /// affects it.
    fn open_context(&mut self, frame: &mut Frame) {
        let extra = self.options.enable_extra_syntax;
        let bullet = self.options.bullet_list_marker;
        let in_table = extra && self.enclosing_table().is_some();
        let parent = self.current_mut();

        if parent.in_code() {
            if frame.tag() == "code" {
                if let FrameContext::Pre { language } = &mut parent.context {
                    if language.is_none() {
                        *language = frame.attr("class").and_then(code_language);
                    }
                }
            }
            return;
        }

        frame.context = match frame.tag() {
            "ul" => FrameContext::List {
                ordered: false,
                next: 1,
            },
            "ol" => FrameContext::List {
                ordered: true,
                next: frame
                    .attr("start")
                    .and_then(|start| start.trim().parse().ok())
                    .unwrap_or(1),
            },
            "li" => {
                let marker = match &mut parent.context {
                    FrameContext::List {
                        ordered: true,
                        next,
                    } => {
                        let marker = ordinal_marker(*next);
                        *next = next.saturating_add(1);
                        marker
                    }
                    _ => bullet_marker(bullet),
                };
                frame.indent_by(marker.len());
                FrameContext::ListItem { marker }
            }
            "pre" => FrameContext::Pre { language: None },
            "blockquote" => {
                frame.indent_by(2);
                FrameContext::None
            }
            "table" if extra => FrameContext::Table(TableState::default()),
            // A row outside any table keeps its cells as plain content
            "tr" if in_table => FrameContext::Row {
                cells: Vec::new(),
                header: parent.tag() == "thead",
            },
            "dl" if extra => FrameContext::DefinitionList {
                after_definition: false,
            },
            "dd" if extra => {
                frame.indent_by(4);
                FrameContext::None
            }
            _ => FrameContext::None,
        };
    }

    fn close_tag(&mut self, tag: &Tag<'_>) {
        let Some(index) = self
            .stack
            .iter()
            .rposition(|frame| !frame.is_root() && frame.tag() == tag.name)
        else {
            log::debug!("ignoring </{}> without an open element", tag.name);
            return;
        };

        while self.stack.len() > index + 1 {
            if let Some(frame) = self.stack.pop() {
                log::debug!("closing <{}> implicitly at </{}>", frame.tag(), tag.name);
                self.close_frame(frame, tag.span.start);
            }
        }
        if let Some(frame) = self.stack.pop() {
            self.close_frame(frame, tag.span.end);
        }
    }

    /// Render a popped frame into its parent. `end` is the input offset just
    /// past the element.
    fn close_frame(&mut self, mut frame: Frame, end: usize) {
        log::trace!("pop <{}>", frame.tag());

        match frame.context {
            FrameContext::Removed => return,
            FrameContext::Kept => {
                let input = self.input;
                self.append(&input[frame.span_start()..end], frame.is_block());
                return;
            }
            _ => {}
        }

        // Inside code only the text counts
        if self.current().in_code() {
            let content = std::mem::take(&mut frame.buffer);
            self.current_mut().buffer.push_str(&content);
            return;
        }

        if frame.is_block() && !frame.in_code() {
            flush(&mut frame, self.options);
            if is_single_line(frame.tag()) {
                frame.buffer = single_line(&frame.buffer);
            }
        }

        if self.options.enable_extra_syntax && self.absorb_table_part(&mut frame) {
            return;
        }

        let markdown = self.render(&frame);
        if self.options.enable_extra_syntax {
            self.note_definition_part(frame.tag());
        }
        self.append(&markdown, frame.is_block());

        if frame.is_block() && self.stack.len() == 1 {
            self.after_top_level_block();
        }
    }

    fn render(&self, frame: &Frame) -> String {
        let content = frame.buffer.as_str();
        let ctx = RuleContext::new(self.options, self.stack.last(), &self.references);

        if let Some(rule) = self.rules.for_frame(frame, self.options) {
            return rule.replace(frame, content, &ctx);
        }

        let tag = frame.tag();
        if self.options.keep_html_for_unknown_tags && !is_transparent(tag) {
            log::debug!("keeping <{}> as HTML", tag);
            return if frame.is_block() {
                format!("\n\n{}{}</{}>\n\n", frame.raw_open(), content.trim_matches('\n'), tag)
            } else {
                format!("{}{}</{}>", frame.raw_open(), content, tag)
            };
        }
        if is_block_element(tag).is_none() {
            log::debug!("no rule for unknown <{}>, keeping its content", tag);
        }

        if frame.is_block() {
            format!("\n\n{}\n\n", content.trim_matches('\n'))
        } else {
            content.to_string()
        }
    }

    fn void_tag(&mut self, tag: &Tag<'_>) {
        let parent = self.current();
        if parent.is_discarding() {
            return;
        }
        if parent.in_code() {
            if tag.name == "br" {
                self.current_mut().buffer.push('\n');
            }
            return;
        }

        let block = self.is_block(tag);
        let frame = Frame::open(tag, block, parent);
        if self.rules.should_remove(&frame, self.options) {
            return;
        }

        let markdown = if self.rules.should_keep(&frame, self.options) {
            tag.raw.to_string()
        } else if let Some(rule) = self.rules.for_frame(&frame, self.options) {
            let ctx = RuleContext::new(self.options, Some(parent), &self.references);
            rule.replace(&frame, "", &ctx)
        } else if self.options.keep_html_for_unknown_tags && !is_transparent(&tag.name) {
            log::debug!("keeping <{}> as HTML", tag.name);
            tag.raw.to_string()
        } else {
            String::new()
        };

        self.append(&markdown, block);
        if block && self.stack.len() == 1 {
            self.after_top_level_block();
        }
    }

    fn text(&mut self, text: &str) {
        let frame = self.current_mut();
        if frame.is_discarding() {
            return;
        }
        if frame.in_code() {
            frame.buffer.push_str(text);
            return;
        }
        frame.push_inline(&escape_markdown(text));
    }

    /// Comments, doctypes and processing instructions.
    fn markup(&mut self, raw: &str, block: bool) {
        if !self.options.pass_through_markup || self.current().is_discarding() {
            return;
        }
        if block {
            self.append(&format!("\n\n{raw}\n\n"), true);
        } else {
            self.append(raw, false);
        }
    }

    /// Add rendered Markdown to the current frame.
    fn append(&mut self, markdown: &str, block: bool) {
        let options = self.options;
        let frame = self.current_mut();

        if frame.in_code() {
            frame.buffer.push_str(markdown);
        } else if block && frame.is_block() {
            flush(frame, options);
            join_block(&mut frame.buffer, markdown);
        } else if block {
            // A block inside an inline element joins the inline text
            let text = markdown.trim_matches('\n');
            if !frame.buffer.is_empty() && !frame.buffer.ends_with(char::is_whitespace) {
                frame.buffer.push(' ');
            }
            frame.push_inline(text);
        } else {
            frame.push_inline(markdown);
        }
    }

    /// Hand finished cells, rows and captions to their table. Returns
    /// `false` when the element is not inside one.
    fn absorb_table_part(&mut self, frame: &mut Frame) -> bool {
        match frame.tag() {
            "td" | "th" => {
                let cell = TableCell {
                    content: frame.buffer.trim().replace('|', "\\|"),
                    header: frame.tag() == "th",
                    alignment: cell_alignment(frame),
                };
                match &mut self.current_mut().context {
                    FrameContext::Row { cells, .. } => {
                        cells.push(cell);
                        true
                    }
                    _ => false,
                }
            }
            "tr" => {
                let FrameContext::Row { cells, header } = &mut frame.context else {
                    return false;
                };
                let Some(table) = self.enclosing_table() else {
                    return false;
                };
                table.rows.push(TableRow {
                    cells: std::mem::take(cells),
                    in_head: *header,
                });
                true
            }
            "caption" => {
                let caption = frame.buffer.trim().to_string();
                match self.enclosing_table() {
                    Some(table) => {
                        table.caption = Some(caption);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn enclosing_table(&mut self) -> Option<&mut TableState> {
        self.stack
            .iter_mut()
            .rev()
            .find_map(|frame| match &mut frame.context {
                FrameContext::Table(state) => Some(state),
                _ => None,
            })
    }

    fn note_definition_part(&mut self, tag: &str) {
        if let FrameContext::DefinitionList { after_definition } = &mut self.current_mut().context {
            match tag {
                "dd" => *after_definition = true,
                "dt" => *after_definition = false,
                _ => {}
            }
        }
    }

    fn after_top_level_block(&mut self) {
        if self.options.link_style != LinkStyle::Referenced || !self.options.links_after_each_paragraph {
            return;
        }
        let definitions = self.references.get_mut().take_link_definitions();
        if !definitions.is_empty() {
            let root = self.current_mut();
            join_block(&mut root.buffer, &format!("\n\n{definitions}\n\n"));
        }
    }

    fn finish(mut self) -> String {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                log::debug!("closing unclosed <{}> at end of input", frame.tag());
                let end = self.input.len();
                self.close_frame(frame, end);
            }
        }

        let options = self.options;
        let references = self.references.get_mut();
        let links = references.take_link_definitions();
        let abbreviations = references.abbreviation_definitions();

        let root = self.current_mut();
        flush(root, options);
        for definitions in [links, abbreviations] {
            if !definitions.is_empty() {
                join_block(&mut root.buffer, &format!("\n\n{definitions}\n\n"));
            }
        }

        root.buffer.trim_start_matches('\n').trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        convert_with(html, &Options::default())
    }

    fn convert_with(html: &str, options: &Options) -> String {
        let rules = Rules::new();
        Engine::new(html, options, &rules).run()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(convert("plain text"), "plain text");
    }

    #[test]
    fn test_paragraph_spacing() {
        assert_eq!(convert("<p>a</p><p>b</p>"), "a\n\nb");
        assert_eq!(convert("<p>a</p>\n\n\n   <p>b</p>\n"), "a\n\nb");
    }

    #[test]
    fn test_whitespace_collapses_outside_pre() {
        assert_eq!(convert("<p>a   b</p>"), "a b");
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        assert_eq!(convert("<pre>a   b\nc</pre>"), "    a   b\n    c");
    }

    #[test]
    fn test_pre_with_code_and_entities() {
        assert_eq!(
            convert("<pre><code>if a &lt; b {\n    <b>go</b>();\n}</code></pre>"),
            "    if a < b {\n        go();\n    }"
        );
    }

    #[test]
    fn test_fenced_code_language() {
        let options = Options {
            code_block_style: crate::options::CodeBlockStyle::Fenced,
            ..Default::default()
        };
        assert_eq!(
            convert_with("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>", &options),
            "```rust\nfn main() {}\n```"
        );
    }

    #[test]
    fn test_malformed_tag_is_escaped() {
        let markdown = convert("<divfoo='bar'</div>");
        assert!(markdown.contains("&lt;divfoo='bar'"));
    }

    #[test]
    fn test_link_and_strong() {
        assert_eq!(convert(r#"<a href="http://x.com">t</a>"#), "[t](http://x.com)");
        assert_eq!(convert("<strong>x</strong>"), "**x**");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(convert("<p>2 * 3 = [six]</p>"), "2 \\* 3 = \\[six\\]");
        assert_eq!(convert("<p># not a heading</p>"), "\\# not a heading");
    }

    #[test]
    fn test_break_drops_following_space() {
        assert_eq!(convert("<p>one<br> two</p>"), "one  \ntwo");
    }

    #[test]
    fn test_break_before_list_marker_is_escaped() {
        assert_eq!(convert("<p>a<br>- b</p>"), "a  \n\\- b");
    }

    #[test]
    fn test_inline_run_next_to_blocks() {
        assert_eq!(convert("before<p>inside</p>after"), "before\n\ninside\n\nafter");
    }

    #[test]
    fn test_nested_lists() {
        assert_eq!(
            convert("<ul><li>A<ul><li>B</li></ul></li><li>C</li></ul>"),
            "*   A\n    *   B\n*   C"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(
            convert("<ol start=\"9\"><li>nine</li><li>ten</li></ol>"),
            "9.  nine\n10. ten"
        );
    }

    #[test]
    fn test_ordered_list_start_at_max() {
        assert_eq!(
            convert(r#"<ol start="4294967295"><li>a</li><li>b</li></ol>"#),
            "4294967295. a\n4294967295. b"
        );
    }

    #[test]
    fn test_list_item_paragraphs() {
        assert_eq!(
            convert("<ul><li><p>one</p><p>two</p></li></ul>"),
            "*   one\n\n    two"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            convert("<blockquote><p>a</p><p>b</p></blockquote>"),
            "> a\n>\n> b"
        );
    }

    #[test]
    fn test_wrapping_respects_prefix() {
        let options = Options {
            wrap_column: 12,
            ..Default::default()
        };
        assert_eq!(
            convert_with("<p>aaa bbb ccc ddd</p>", &options),
            "aaa bbb ccc\nddd"
        );
        assert_eq!(
            convert_with("<blockquote><p>aaa bbb ccc ddd</p></blockquote>", &options),
            "> aaa bbb\n> ccc ddd"
        );
    }

    #[test]
    fn test_removed_elements() {
        assert_eq!(
            convert("<html><head><title>T</title></head><body><p>x</p><script>a<b</script></body></html>"),
            "x"
        );
    }

    #[test]
    fn test_unknown_tag_content_kept() {
        assert_eq!(convert("<p>a <foo>b</foo> c</p>"), "a b c");
    }

    #[test]
    fn test_unknown_tag_kept_as_html() {
        let options = Options {
            keep_html_for_unknown_tags: true,
            ..Default::default()
        };
        assert_eq!(
            convert_with("<p>H<sub>2</sub>O in a <span>box</span></p>", &options),
            "H<sub>2</sub>O in a box"
        );
    }

    #[test]
    fn test_unknown_tag_block_policy() {
        let options = Options {
            unknown_tag_policy: UnknownTagPolicy::Block,
            ..Default::default()
        };
        assert_eq!(convert_with("a<foo>b</foo>c", &options), "a\n\nb\n\nc");
    }

    #[test]
    fn test_markup_pass_through() {
        let options = Options {
            pass_through_markup: true,
            ..Default::default()
        };
        assert_eq!(
            convert_with("<!DOCTYPE html><p>a<!-- note -->b</p>", &options),
            "<!DOCTYPE html>\n\na<!-- note -->b"
        );
        assert_eq!(convert("<!DOCTYPE html><p>a<!-- note -->b</p>"), "ab");
    }

    #[test]
    fn test_unclosed_frames_are_rendered() {
        assert_eq!(convert("<p>a <b>bold"), "a **bold**");
    }

    #[test]
    fn test_referenced_links() {
        let options = Options {
            link_style: LinkStyle::Referenced,
            ..Default::default()
        };
        assert_eq!(
            convert_with(
                r#"<p><a href="http://a.com">a</a> <a href="http://b.com" title="B">b</a></p><p><a href="http://a.com">again</a></p>"#,
                &options
            ),
            "[a][1] [b][2]\n\n[again][1]\n\n[1]: http://a.com\n[2]: http://b.com \"B\""
        );
    }

    #[test]
    fn test_links_after_each_paragraph() {
        let options = Options {
            link_style: LinkStyle::Referenced,
            links_after_each_paragraph: true,
            ..Default::default()
        };
        assert_eq!(
            convert_with(
                r#"<p><a href="http://a.com">a</a></p><p><a href="http://b.com">b</a></p>"#,
                &options
            ),
            "[a][1]\n\n[1]: http://a.com\n\n[b][2]\n\n[2]: http://b.com"
        );
    }

    fn extra() -> Options {
        Options {
            enable_extra_syntax: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_table() {
        let html = "<table>\n<thead><tr><th>Name</th><th align=\"right\">Qty</th></tr></thead>\n\
                    <tbody><tr><td>Apple</td><td>3</td></tr><tr><td>Pear | Fig</td></tr></tbody>\n</table>";
        assert_eq!(
            convert_with(html, &extra()),
            "| Name        | Qty |\n| ----------- | --: |\n| Apple       | 3   |\n| Pear \\| Fig |     |"
        );
    }

    #[test]
    fn test_table_without_extra_syntax() {
        assert_eq!(
            convert("<table><tr><td>a</td><td>b</td></tr></table>"),
            "a\n\nb"
        );
    }

    #[test]
    fn test_row_outside_table_keeps_cells() {
        assert_eq!(convert_with("<div><tr><td>lost</td></tr></div>", &extra()), "lost");
        assert_eq!(
            convert_with("<div><tr><td>a</td><td>b</td></tr></div>", &extra()),
            "a\n\nb"
        );
    }

    #[test]
    fn test_definition_list() {
        let html = "<dl><dt>Apple</dt><dd>Pomaceous fruit.</dd><dt>Orange</dt><dd>Citrus.</dd></dl>";
        assert_eq!(
            convert_with(html, &extra()),
            "Apple\n:   Pomaceous fruit.\n\nOrange\n:   Citrus."
        );
    }

    #[test]
    fn test_abbreviation() {
        assert_eq!(
            convert_with(r#"<p>The <abbr title="HyperText Markup Language">HTML</abbr> standard</p>"#, &extra()),
            "The HTML standard\n\n*[HTML]: HyperText Markup Language"
        );
    }

    #[test]
    fn test_heading_id() {
        assert_eq!(convert_with(r#"<h2 id="intro">Intro</h2>"#, &extra()), "## Intro {#intro}");
        assert_eq!(convert(r#"<h2 id="intro">Intro</h2>"#), "## Intro");
    }
}
