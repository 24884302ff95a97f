//! Re-indent HTML using the tokenizer.

use crate::node::Node;
use crate::tokenizer::Tokenizer;

fn push_indent(out: &mut String, indent: &str, level: usize) {
    for _ in 0..level {
        out.push_str(indent);
    }
}

/// Indent an HTML string by block nesting depth.
///
/// Block tags go on their own line; inline runs start on a fresh, indented
/// line after a block tag. Comments, doctypes and processing instructions
/// end their line. `pre` contents are copied verbatim.
///
/// ```rust
/// use markdownify_core::indent_html;
///
/// let html = indent_html("<div><p>Hello <b>World</b></p></div>", "  ");
/// assert_eq!(html, "<div>\n  <p>\n    Hello <b>World</b>\n  </p>\n</div>\n");
/// ```
pub fn indent_html(html: &str, indent: &str) -> String {
    let mut tokenizer = Tokenizer::new(html);
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut level = 0usize;
    let mut line_start = true;

    while let Some(node) = tokenizer.next_node() {
        let keep = tokenizer.keeps_whitespace();
        match &node {
            Node::Tag(tag) if tag.block == Some(true) => {
                let pre_or_code = matches!(tag.name.as_str(), "pre" | "code");
                if !keep && !line_start && !pre_or_code {
                    out.push('\n');
                }
                if tag.is_opening {
                    push_indent(&mut out, indent, level);
                    if !tag.is_void {
                        level += 1;
                    }
                } else {
                    level = level.saturating_sub(1);
                    if !pre_or_code {
                        push_indent(&mut out, indent, level);
                    }
                }
                out.push_str(tag.raw);
                if !keep && !(pre_or_code && tag.is_opening) {
                    out.push('\n');
                }
                line_start = true;
            }
            _ => {
                if line_start && !keep {
                    push_indent(&mut out, indent, level);
                }
                match &node {
                    Node::Text(text) => out.push_str(&text.text),
                    other => out.push_str(other.raw()),
                }
                if matches!(
                    node,
                    Node::Comment { .. } | Node::Doctype { .. } | Node::ProcessingInstruction { .. }
                ) {
                    out.push('\n');
                } else {
                    line_start = false;
                }
            }
        }
    }

    out
}
