//! CommonMark rules for HTML to Markdown conversion.

use markdownify_core::decode_entities;

use super::{Filter, Rule, RuleContext};
use crate::frame::{Frame, FrameContext};
use crate::options::{CodeBlockStyle, HeadingStyle, LinkStyle};
use crate::utilities::{clean_attribute, escape_markdown, longest_run, prefix_lines, repeat};

/// Elements that only contribute their content.
pub const TRANSPARENT_ELEMENTS: &[&str] = &[
    "html", "body", "div", "span", "font", "center", "section", "article", "main", "header",
    "footer", "nav", "aside", "address", "form", "fieldset", "figure", "figcaption", "details",
    "summary", "label", "small", "big", "tt", "noscript",
];

/// Elements whose content never reaches the output.
pub const REMOVED_ELEMENTS: &[&str] = &["head", "script", "style", "title"];

/// Newer block containers the classifier does not know. They are laid out
/// as blocks whatever the unknown tag policy says.
pub const SECTIONING_ELEMENTS: &[&str] = &[
    "article", "aside", "details", "figcaption", "figure", "footer", "header", "main", "nav",
    "section", "summary",
];

pub fn is_sectioning(tag: &str) -> bool {
    SECTIONING_ELEMENTS.contains(&tag)
}

pub fn is_transparent(tag: &str) -> bool {
    TRANSPARENT_ELEMENTS.contains(&tag)
}

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        code_block_rule(),
        horizontal_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| "  \n".to_string())
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |frame, content, ctx| heading(frame, content, ctx, None),
    )
}

/// Render a heading, with an optional `{#id}` suffix.
pub(crate) fn heading(frame: &Frame, content: &str, ctx: &RuleContext<'_>, id: Option<&str>) -> String {
    let level: usize = frame.tag()[1..].parse().unwrap_or(1);

    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    let suffix = id.map(|id| format!(" {{#{id}}}")).unwrap_or_default();

    match ctx.options.heading_style {
        HeadingStyle::Setext if level <= 2 => {
            let underline = if level == 1 { "=" } else { "-" };
            let text = format!("{content}{suffix}");
            let width = text.chars().count();
            format!("\n\n{}\n{}\n\n", text, repeat(underline, width))
        }
        _ => format!("\n\n{} {}{}\n\n", repeat("#", level), content, suffix),
    }
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::new(Filter::tags(&["ul", "ol"]), |_, content, ctx| {
        let content = content.trim_matches('\n');
        if content.is_empty() {
            return String::new();
        }

        // Nested lists attach to the item text without a blank line
        if matches!(ctx.parent_tag(), Some("li" | "dd")) {
            format!("\n{}\n", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

/// Marker for an unordered item, padded to four columns.
pub(crate) fn bullet_marker(bullet: char) -> String {
    format!("{:<4}", bullet)
}

/// Marker for the ordered item `n`, padded to four columns.
pub(crate) fn ordinal_marker(n: u32) -> String {
    let marker = format!("{n}.");
    if marker.len() < 4 {
        format!("{:<4}", marker)
    } else {
        format!("{marker} ")
    }
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |frame, content, ctx| {
        let marker = match frame.context() {
            FrameContext::ListItem { marker } => marker.clone(),
            _ => bullet_marker(ctx.options.bullet_list_marker),
        };
        let indent = " ".repeat(marker.len());
        let content = content.trim_matches('\n');

        format!("{}\n", prefix_lines(content, &marker, &indent))
    })
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |frame, content, ctx| {
        let code = decode_entities(content);
        // A newline right after <pre> is not content
        let code = code.strip_prefix('\n').unwrap_or(&code);
        let code = code.trim_end_matches(&['\n', '\r'][..]);
        if code.trim().is_empty() {
            return String::new();
        }

        match ctx.options.code_block_style {
            CodeBlockStyle::Indented => {
                let indented: Vec<String> = code
                    .split('\n')
                    .map(|line| {
                        if line.trim().is_empty() {
                            String::new()
                        } else {
                            format!("    {}", line)
                        }
                    })
                    .collect();
                format!("\n\n{}\n\n", indented.join("\n"))
            }
            CodeBlockStyle::Fenced => {
                let language = match frame.context() {
                    FrameContext::Pre { language } => language.as_deref().unwrap_or(""),
                    _ => "",
                };
                let fence = code_fence(&ctx.options.fence, code);
                format!("\n\n{}{}\n{}\n{}\n\n", fence, language, code, fence)
            }
        }
    })
}

/// The configured fence, lengthened past any fence-like run in `code`.
fn code_fence(fence: &str, code: &str) -> String {
    let Some(fence_char) = fence.chars().next() else {
        return "```".to_string();
    };
    let run = longest_run(code, fence_char);
    if run >= fence.chars().count() {
        repeat(&fence_char.to_string(), run + 1)
    } else {
        fence.to_string()
    }
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, ctx| format!("\n\n{}\n\n", ctx.options.hr))
}

fn is_absolute_url(url: &str) -> bool {
    url.contains("://") || url.starts_with("mailto:")
}

/// Link destination, in angle brackets when it would not parse bare.
pub(crate) fn destination(url: &str) -> String {
    if url.contains(&[' ', '(', ')'][..]) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

fn title_part(title: Option<&str>) -> String {
    title
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default()
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |frame, content, ctx| {
        let href = clean_attribute(frame.attr("href"));
        let href = decode_entities(&href);
        let title = frame.attr("title").map(decode_entities);
        let title = title.as_deref();

        if href.is_empty() {
            return content.to_string();
        }
        // Nothing to click on; whitespace still separates words
        if content.trim().is_empty() {
            return content.to_string();
        }

        match ctx.options.link_style {
            LinkStyle::Referenced => {
                let id = ctx.link_reference(&destination(&href), title);
                format!("[{}][{}]", content, id)
            }
            LinkStyle::Inlined => {
                if title.is_none() && is_absolute_url(&href) && content == escape_markdown(&href) {
                    return format!("<{}>", href);
                }
                format!("[{}]({}{})", content, destination(&href), title_part(title))
            }
        }
    })
}

/// Wrap `content` in `delimiter`, moving surrounding whitespace outside.
fn delimit(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{delimiter}{trimmed}{delimiter}{trailing}")
}

fn emphasis_rule() -> Rule {
    Rule::new(Filter::tags(&["em", "i"]), |_, content, ctx| {
        delimit(content, &ctx.options.em_delimiter.to_string())
    })
}

fn strong_rule() -> Rule {
    Rule::new(Filter::tags(&["strong", "b"]), |_, content, ctx| {
        delimit(content, &ctx.options.strong_delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::for_tag("code", |_, content, ctx| {
        if ctx.parent.is_some_and(Frame::in_code) {
            return content.to_string();
        }

        let code = decode_entities(content).replace(&['\n', '\r'][..], " ");
        if code.is_empty() {
            return String::new();
        }

        let backticks = "`".repeat(longest_run(&code, '`') + 1);
        if code.starts_with('`') || code.ends_with('`') {
            format!("{} {} {}", backticks, code, backticks)
        } else {
            format!("{}{}{}", backticks, code, backticks)
        }
    })
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |frame, _, _| {
        let src = clean_attribute(frame.attr("src"));
        if src.is_empty() {
            return String::new();
        }
        let src = decode_entities(&src);
        let alt = escape_markdown(&clean_attribute(frame.attr("alt")));
        let title = frame.attr("title").map(decode_entities);

        format!("![{}]({}{})", alt, destination(&src), title_part(title.as_deref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimit_moves_whitespace_out() {
        assert_eq!(delimit(" x ", "**"), " **x** ");
        assert_eq!(delimit("x", "_"), "_x_");
        assert_eq!(delimit("  ", "_"), "  ");
    }

    #[test]
    fn test_markers() {
        assert_eq!(bullet_marker('*'), "*   ");
        assert_eq!(ordinal_marker(1), "1.  ");
        assert_eq!(ordinal_marker(10), "10. ");
        assert_eq!(ordinal_marker(100), "100. ");
    }

    #[test]
    fn test_destination() {
        assert_eq!(destination("http://x.com/a"), "http://x.com/a");
        assert_eq!(destination("a b.html"), "<a b.html>");
        assert_eq!(destination("wiki/Rust_(language)"), "<wiki/Rust_(language)>");
    }

    #[test]
    fn test_code_fence_grows() {
        assert_eq!(code_fence("```", "let x = 1;"), "```");
        assert_eq!(code_fence("```", "```\nnested\n```"), "````");
        assert_eq!(code_fence("~~~", "~~~~"), "~~~~~");
    }
}
