//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod extra;
mod rule;

pub use commonmark::{
    commonmark_rules, is_sectioning, is_transparent, REMOVED_ELEMENTS, SECTIONING_ELEMENTS,
    TRANSPARENT_ELEMENTS,
};
pub use extra::extra_rules;
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule, RuleContext};

pub(crate) use commonmark::{bullet_marker, ordinal_marker};
pub(crate) use extra::cell_alignment;

use indexmap::IndexMap;

use crate::frame::Frame;
use crate::options::Options;

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Keep rules (preserve as HTML)
    keep_rules: Vec<Filter>,
    /// Remove rules (remove entirely)
    remove_rules: Vec<Filter>,
    /// Built-in CommonMark rules
    commonmark_rules: Vec<Rule>,
    /// Markdown Extra rules, ahead of CommonMark when enabled
    extra_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: vec![Filter::tags(REMOVED_ELEMENTS)],
            commonmark_rules: commonmark_rules(),
            extra_rules: extra_rules(),
        }
    }

    /// Add a custom rule; a rule under the same key is replaced
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    fn built_in<'a>(&'a self, options: &Options) -> impl Iterator<Item = &'a Rule> {
        let extra: &[Rule] = if options.enable_extra_syntax {
            &self.extra_rules
        } else {
            &[]
        };
        extra.iter().chain(&self.commonmark_rules)
    }

    /// Find the appropriate rule for an element
    pub fn for_frame<'a>(&'a self, frame: &Frame, options: &Options) -> Option<&'a Rule> {
        self.custom_rules
            .values()
            .chain(self.built_in(options))
            .find(|rule| rule.filter.matches(frame, options))
    }

    /// Check if an element should be kept as HTML
    pub fn should_keep(&self, frame: &Frame, options: &Options) -> bool {
        // Don't keep if a custom or built-in rule matches
        if self.for_frame(frame, options).is_some() {
            return false;
        }

        self.keep_rules
            .iter()
            .any(|filter| filter.matches(frame, options))
    }

    /// Check if an element should be removed
    pub fn should_remove(&self, frame: &Frame, options: &Options) -> bool {
        if self.should_keep(frame, options) {
            return false;
        }

        // Don't remove if a custom or built-in rule matches
        if self.for_frame(frame, options).is_some() {
            return false;
        }

        self.remove_rules
            .iter()
            .any(|filter| filter.matches(frame, options))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
