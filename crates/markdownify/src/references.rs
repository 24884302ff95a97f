//! Link and abbreviation definitions collected during a conversion.

use indexmap::{IndexMap, IndexSet};

/// Reference-style link targets and abbreviation titles.
#[derive(Debug, Default)]
pub struct References {
    links: IndexSet<(String, Option<String>)>,
    /// Number of link definitions already written out
    emitted: usize,
    abbreviations: IndexMap<String, String>,
}

impl References {
    /// 1-based number of the definition for `url` and `title`
    pub fn link(&mut self, url: &str, title: Option<&str>) -> usize {
        let (index, _) = self
            .links
            .insert_full((url.to_string(), title.map(str::to_string)));
        index + 1
    }

    /// The first title recorded for an abbreviation wins.
    pub fn abbreviation(&mut self, abbreviation: &str, title: &str) {
        self.abbreviations
            .entry(abbreviation.to_string())
            .or_insert_with(|| title.to_string());
    }

    /// Definitions created since the last call, one per line.
    pub fn take_link_definitions(&mut self) -> String {
        let definitions = self
            .links
            .iter()
            .enumerate()
            .skip(self.emitted)
            .map(|(i, (url, title))| match title {
                Some(title) => format!("[{}]: {} \"{}\"", i + 1, url, title.replace('"', "\\\"")),
                None => format!("[{}]: {}", i + 1, url),
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.emitted = self.links.len();
        definitions
    }

    pub fn abbreviation_definitions(&self) -> String {
        self.abbreviations
            .iter()
            .map(|(abbreviation, title)| format!("*[{abbreviation}]: {title}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
