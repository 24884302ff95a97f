//! Markdownify - the main entry point for HTML to Markdown conversion.

use once_cell::sync::Lazy;

use crate::engine::Engine;
use crate::options::Options;
use crate::rules::{Filter, Rule, Rules};
use crate::{MarkdownifyError, Result};

static DEFAULT_RULES: Lazy<Rules> = Lazy::new(Rules::new);

/// Convert HTML to Markdown with the built-in rules.
pub fn convert(html: &str, options: &Options) -> String {
    Engine::new(html, options, &DEFAULT_RULES).run()
}

/// The main service for converting HTML to Markdown
pub struct Markdownify {
    options: Options,
    rules: Rules,
}

impl Markdownify {
    /// Create a new converter with default options
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            rules: Rules::new(),
        }
    }

    /// Create a converter with custom options
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert HTML to Markdown. Malformed markup degrades, it never fails.
    pub fn convert(&self, html: &str) -> String {
        log::trace!("converting {} bytes of HTML", html.len());
        Engine::new(html, &self.options, &self.rules).run()
    }

    /// Convert raw bytes, which must be UTF-8.
    pub fn convert_bytes(&self, html: &[u8]) -> Result<String> {
        let html = std::str::from_utf8(html)
            .map_err(|err| MarkdownifyError::InvalidInput(err.to_string()))?;
        Ok(self.convert(html))
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        crate::utilities::escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }
}

impl Default for Markdownify {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CodeBlockStyle, HeadingStyle};

    #[test]
    fn test_simple_paragraph() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<p>Hello World</p>"), "Hello World");
    }

    #[test]
    fn test_heading_atx() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<h1>Title</h1>"), "# Title");
        assert_eq!(service.convert("<h3>Deep <em>one</em></h3>"), "### Deep _one_");
    }

    #[test]
    fn test_heading_setext() {
        let options = Options {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        };
        let service = Markdownify::with_options(options);
        assert_eq!(service.convert("<h1>Title</h1>"), "Title\n=====");
        assert_eq!(service.convert("<h2>Sub</h2>"), "Sub\n---");
        assert_eq!(service.convert("<h3>Deep</h3>"), "### Deep");
    }

    #[test]
    fn test_emphasis() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<em>emphasized</em>"), "_emphasized_");
        assert_eq!(service.convert("<p>a<em> b </em>c</p>"), "a _b_ c");
    }

    #[test]
    fn test_strong() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<strong>bold</strong>"), "**bold**");
        assert_eq!(service.convert("<b></b>"), "");
    }

    #[test]
    fn test_inline_link() {
        let service = Markdownify::new();
        assert_eq!(
            service.convert(r#"<a href="https://example.com">Link</a>"#),
            "[Link](https://example.com)"
        );
        assert_eq!(
            service.convert(r#"<a href="/a?b=1&amp;c=2" title="Say &quot;hi&quot;">x</a>"#),
            r#"[x](/a?b=1&c=2 "Say \"hi\"")"#
        );
        assert_eq!(
            service.convert(r#"<a href="my page.html">x</a>"#),
            "[x](<my page.html>)"
        );
    }

    #[test]
    fn test_autolink() {
        let service = Markdownify::new();
        assert_eq!(
            service.convert(r#"<a href="http://x.com/a_b">http://x.com/a_b</a>"#),
            "<http://x.com/a_b>"
        );
    }

    #[test]
    fn test_anchor_without_href() {
        let service = Markdownify::new();
        assert_eq!(service.convert(r#"<a name="top">Top</a>"#), "Top");
    }

    #[test]
    fn test_empty_anchor_renders_nothing() {
        let service = Markdownify::new();
        assert_eq!(service.convert(r#"<p>see <a href="x"></a>here</p>"#), "see here");
        assert_eq!(service.convert(r#"<p>see<a href="x"> </a>here</p>"#), "see here");
        assert_eq!(service.convert(r#"<a href="x"/>"#), "");
    }

    #[test]
    fn test_image() {
        let service = Markdownify::new();
        assert_eq!(
            service.convert(r#"<img src="test.png" alt="Alt">"#),
            "![Alt](test.png)"
        );
        assert_eq!(
            service.convert(r#"<img src="a.png" alt="" title="T" />"#),
            "![](a.png \"T\")"
        );
        assert_eq!(service.convert(r#"<img alt="none">"#), "");
    }

    #[test]
    fn test_inline_code() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<code>code</code>"), "`code`");
        assert_eq!(service.convert("<code>a ` b</code>"), "``a ` b``");
        assert_eq!(service.convert("<code>`tick</code>"), "`` `tick ``");
        assert_eq!(service.convert("<code>&lt;p&gt;</code>"), "`<p>`");
    }

    #[test]
    fn test_horizontal_rule() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<p>a</p><hr><p>b</p>"), "a\n\n* * *\n\nb");
    }

    #[test]
    fn test_blockquote() {
        let service = Markdownify::new();
        assert_eq!(service.convert("<blockquote><p>Quote</p></blockquote>"), "> Quote");
    }

    #[test]
    fn test_indented_code_block() {
        let service = Markdownify::new();
        assert_eq!(
            service.convert("<pre><code>function() {}</code></pre>"),
            "    function() {}"
        );
    }

    #[test]
    fn test_fenced_code_block() {
        let options = Options {
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        };
        let service = Markdownify::with_options(options);
        assert_eq!(
            service.convert("<pre>\nline 1\n\n\nline 2\n</pre>"),
            "```\nline 1\n\n\nline 2\n```"
        );
    }

    #[test]
    fn test_ordered_list() {
        let service = Markdownify::new();
        assert_eq!(
            service.convert("<ol><li>One</li><li>Two</li></ol>"),
            "1.  One\n2.  Two"
        );
    }

    #[test]
    fn test_unordered_list_marker() {
        let mut service = Markdownify::new();
        service.options_mut().bullet_list_marker = '-';
        assert_eq!(
            service.convert("<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>"),
            "-   One\n-   Two"
        );
    }

    #[test]
    fn test_add_rule() {
        let mut service = Markdownify::new();
        service.add_rule(
            "mark",
            Rule::for_tag("mark", |_, content, _| format!("=={content}==")),
        );
        assert_eq!(service.convert("<p><mark>hi</mark> there</p>"), "==hi== there");
    }

    #[test]
    fn test_custom_rule_overrides_built_in() {
        let mut service = Markdownify::new();
        service.add_rule(
            "strong",
            Rule::for_tags(&["strong", "b"], |_, content, _| format!("__{content}__")),
        );
        assert_eq!(service.convert("<b>x</b>"), "__x__");
    }

    #[test]
    fn test_rule_sees_parent() {
        let mut service = Markdownify::new();
        service.add_rule(
            "nested-em",
            Rule::for_tag("em", |_, content, ctx| match ctx.parent_tag() {
                Some("h1") => content.to_string(),
                _ => format!("_{content}_"),
            }),
        );
        assert_eq!(service.convert("<h1>A <em>b</em></h1><em>c</em>"), "# A b\n\n_c_");
    }

    #[test]
    fn test_keep() {
        let mut service = Markdownify::new();
        service.keep(Filter::tag("iframe"));
        assert_eq!(
            service.convert(r#"<p>a <iframe src="x.html"><b>fallback</b></iframe> b</p>"#),
            r#"a <iframe src="x.html"><b>fallback</b></iframe> b"#
        );
    }

    #[test]
    fn test_remove() {
        let mut service = Markdownify::new();
        service.remove(Filter::predicate(|tag, frame, _| {
            tag == "span" && frame.attr("class") == Some("ad")
        }));
        assert_eq!(
            service.convert(r#"<p>a<span class="ad">buy</span><span>c</span></p>"#),
            "ac"
        );
    }

    #[test]
    fn test_use_plugin() {
        let mut service = Markdownify::new();
        service.use_plugin(|s| {
            s.options_mut().enable_extra_syntax = true;
            s.add_rule("kbd", Rule::for_tag("kbd", |_, content, _| format!("<kbd>{content}</kbd>")));
        });
        assert!(service.options().enable_extra_syntax);
        assert_eq!(service.convert("<kbd>Ctrl</kbd>"), "<kbd>Ctrl</kbd>");
    }

    #[test]
    fn test_escape() {
        let service = Markdownify::new();
        assert_eq!(service.escape("*a_b*"), "\\*a\\_b\\*");
    }

    #[test]
    fn test_convert_bytes() {
        let service = Markdownify::new();
        assert_eq!(service.convert_bytes(b"<p>ok</p>").unwrap(), "ok");

        let err = service.convert_bytes(&[b'<', 0xFF, b'>']).unwrap_err();
        assert!(matches!(err, MarkdownifyError::InvalidInput(_)));
    }

    #[test]
    fn test_free_convert() {
        let options = Options::default();
        assert_eq!(convert("<p>a</p><p>b</p>", &options), "a\n\nb");
    }

    #[test]
    fn test_service_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Markdownify>();
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn convert_never_panics(html in "\\PC{0,200}") {
                let _ = convert(&html, &Options::default());
            }

            #[test]
            fn convert_survives_markup_soup(html in "[<>/a-z =\"'!\\-\n&;#]{0,120}") {
                let options = Options {
                    enable_extra_syntax: true,
                    keep_html_for_unknown_tags: true,
                    pass_through_markup: true,
                    wrap_column: 20,
                    ..Default::default()
                };
                let _ = convert(&html, &options);
            }

            #[test]
            fn plain_words_are_unchanged(text in "[a-zA-Z0-9]{1,8}( [a-zA-Z0-9]{1,8}){0,12}") {
                prop_assert_eq!(convert(&text, &Options::default()), text);
            }
        }
    }
}
