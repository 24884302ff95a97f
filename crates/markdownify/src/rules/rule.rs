//! Rule and Filter types for HTML conversion.

use std::cell::RefCell;

use crate::frame::Frame;
use crate::options::Options;
use crate::references::References;

/// Type alias for replacement functions
pub type ReplacementFn = Box<dyn Fn(&Frame, &str, &RuleContext<'_>) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&str, &Frame, &Options) -> bool + Send + Sync>;

/// What a replacement function can see besides the element itself.
pub struct RuleContext<'a> {
    pub options: &'a Options,
    /// The enclosing element, `None` at the top level
    pub parent: Option<&'a Frame>,
    pub(crate) references: &'a RefCell<References>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        options: &'a Options,
        parent: Option<&'a Frame>,
        references: &'a RefCell<References>,
    ) -> Self {
        Self {
            options,
            parent,
            references,
        }
    }

    pub fn parent_tag(&self) -> Option<&str> {
        self.parent.filter(|p| !p.is_root()).map(Frame::tag)
    }

    /// Number of the reference definition for this target, created on
    /// first use.
    pub fn link_reference(&self, url: &str, title: Option<&str>) -> usize {
        self.references.borrow_mut().link(url, title)
    }

    /// Record an abbreviation definition for the end of the document.
    pub fn record_abbreviation(&self, abbreviation: &str, title: &str) {
        self.references
            .borrow_mut()
            .abbreviation(abbreviation, title);
    }
}

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &Frame, &Options) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, frame: &Frame, options: &Options) -> bool {
        let tag = frame.tag();
        match self {
            Filter::TagName(t) => tag == t,
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, frame, options),
        }
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    pub replacement: ReplacementFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&Frame, &str, &RuleContext<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&Frame, &str, &RuleContext<'_>) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&Frame, &str, &RuleContext<'_>) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Apply this rule's replacement
    pub fn replace(&self, frame: &Frame, content: &str, ctx: &RuleContext<'_>) -> String {
        (self.replacement)(frame, content, ctx)
    }
}
