//! Utility functions for Markdown text handling.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Line starts that a Markdown parser would read as block syntax.
static BLOCK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^( {0,3})(?:(>)|(#{1,6}|[+-]|\d+[.)])([ \t]|$))").expect("block marker pattern is valid")
});

static SETEXT_UNDERLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^( {0,3})(=+|-+)([ \t]*)$").expect("underline pattern is valid"));

/// Repeat a string n times
pub fn repeat(s: &str, n: usize) -> String {
    s.repeat(n)
}

/// Escape characters that are Markdown syntax anywhere in a line.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Escape line starts that would turn plain text into headings, quotes,
/// list items or setext underlines.
pub fn escape_line_starts(text: &str) -> Cow<'_, str> {
    let escaped = BLOCK_MARKER.replace_all(text, |caps: &Captures| {
        let indent = &caps[1];
        if caps.get(2).is_some() {
            return format!("{indent}\\>");
        }
        let marker = &caps[3];
        let trailing = &caps[4];
        match marker.char_indices().last() {
            Some((i, last @ ('.' | ')'))) => format!("{indent}{}\\{last}{trailing}", &marker[..i]),
            _ => format!("{indent}\\{marker}{trailing}"),
        }
    });

    if !SETEXT_UNDERLINE.is_match(&escaped) {
        return escaped;
    }
    Cow::Owned(
        SETEXT_UNDERLINE
            .replace_all(&escaped, "$1\\$2$3")
            .into_owned(),
    )
}

/// Greedy word wrap. Existing line breaks are kept, and a trailing hard
/// break (two spaces) stays at the end of its line.
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / width);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let hard_break = line.ends_with("  ");
        let mut column = 0;
        for word in line.split(' ').filter(|w| !w.is_empty()) {
            let len = word.chars().count();
            if column > 0 {
                if column + 1 + len > width {
                    out.push('\n');
                    column = 0;
                } else {
                    out.push(' ');
                    column += 1;
                }
            }
            out.push_str(word);
            column += len;
        }
        if hard_break && column > 0 {
            out.push_str("  ");
        }
    }
    out
}

/// Prefix the first line with `first` and every other non-empty line with
/// `rest`. Empty lines stay empty.
pub fn prefix_lines(content: &str, first: &str, rest: &str) -> String {
    if content.is_empty() {
        return first.trim_end().to_string();
    }

    let mut out = String::with_capacity(content.len() + first.len() * 4);
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if i == 0 {
            out.push_str(first);
        } else if !line.is_empty() {
            out.push_str(rest);
        }
        out.push_str(line);
    }
    out
}

/// Length of the longest run of `ch` in `text`
pub fn longest_run(text: &str, ch: char) -> usize {
    text.chars()
        .fold((0, 0), |(max, current), c| {
            if c == ch {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Append `block` to `buffer` so it starts on its own line.
///
/// Leading newlines of `block` request separation: one means "next line",
/// two or more mean "after a blank line". Separation already present at the
/// end of `buffer` is reused, never doubled.
pub fn join_block(buffer: &mut String, block: &str) {
    let body = block.trim_start_matches('\n');
    if body.is_empty() {
        return;
    }
    if buffer.is_empty() {
        buffer.push_str(body);
        return;
    }

    let requested = (block.len() - body.len()).min(2);
    let present = buffer.len() - buffer.trim_end_matches('\n').len();
    let wanted = requested.max(1);
    for _ in present..wanted {
        buffer.push('\n');
    }
    buffer.push_str(body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*test*"), "\\*test\\*");
        assert_eq!(escape_markdown("snake_case"), "snake\\_case");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("normal text."), "normal text.");
    }

    #[test]
    fn test_escape_line_starts() {
        assert_eq!(escape_line_starts("# not a heading"), "\\# not a heading");
        assert_eq!(escape_line_starts("a\n- b"), "a\n\\- b");
        assert_eq!(escape_line_starts("1. one"), "1\\. one");
        assert_eq!(escape_line_starts("2014. A year"), "2014\\. A year");
        assert_eq!(escape_line_starts(">quoted"), "\\>quoted");
        assert_eq!(escape_line_starts("==="), "\\===");
        assert_eq!(escape_line_starts("a - b #1"), "a - b #1");
        assert_eq!(escape_line_starts("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_escape_line_starts_borrows_plain_text() {
        assert!(matches!(escape_line_starts("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("aaa bbb ccc", 7), "aaa bbb\nccc");
        assert_eq!(wrap_text("aaa bbb ccc", 0), "aaa bbb ccc");
        assert_eq!(wrap_text("averyveryverylongword x", 5), "averyveryverylongword\nx");
    }

    #[test]
    fn test_wrap_text_keeps_hard_breaks() {
        assert_eq!(wrap_text("one two  \nthree", 20), "one two  \nthree");
    }

    #[test]
    fn test_prefix_lines() {
        assert_eq!(prefix_lines("a\n\nb", "*   ", "    "), "*   a\n\n    b");
        assert_eq!(prefix_lines("", "*   ", "    "), "*");
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("a `b` ``c``", '`'), 2);
        assert_eq!(longest_run("none", '`'), 0);
    }

    #[test]
    fn test_repeat() {
        assert_eq!(repeat("=", 5), "=====");
        assert_eq!(repeat("-", 3), "---");
    }

    #[test]
    fn test_join_block() {
        let mut buffer = String::new();
        join_block(&mut buffer, "\n\nfirst\n\n");
        assert_eq!(buffer, "first\n\n");
        join_block(&mut buffer, "\n\nsecond\n\n");
        assert_eq!(buffer, "first\n\nsecond\n\n");

        let mut list = String::from("*   a\n");
        join_block(&mut list, "*   b\n");
        assert_eq!(list, "*   a\n*   b\n");

        let mut item = String::from("Item");
        join_block(&mut item, "\n*   sub\n");
        assert_eq!(item, "Item\n*   sub\n");

        join_block(&mut item, "");
        assert_eq!(item, "Item\n*   sub\n");
    }
}
