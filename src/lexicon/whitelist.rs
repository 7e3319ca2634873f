// Whitelist: legitimate words that happen to contain a lexicon term.
//
// "Scunthorpe", "scrap", "oxymoron". Occurrences are searched in the
// normalized text (overlapping, since whitelist words can nest) and mapped
// back to original offsets so the filter can compare them to match spans.

use std::collections::BTreeSet;
use std::ops::Range;

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Deserialize;
use tracing::warn;

use crate::error::LexiconError;
use crate::normalize::obfuscation::Script;
use crate::normalize::{normalize_or_raw, NormalizedText};

/// Process-wide set of known false-positive terms.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    terms: Vec<String>,
    automaton: Option<AhoCorasick>,
}

#[derive(Debug, Deserialize)]
struct WhitelistFile {
    #[serde(default)]
    terms: Vec<String>,
}

impl Whitelist {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a whitelist from raw terms. Terms are normalized and deduplicated;
    /// blank ones are dropped.
    pub fn new<I, S>(terms: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique = BTreeSet::new();
        for raw in terms {
            let normalized = normalize_or_raw(raw.as_ref().trim(), Script::Latin);
            if normalized.is_empty() {
                warn!(term = raw.as_ref(), "Skipping blank whitelist entry");
                continue;
            }
            unique.insert(normalized.as_str().to_string());
        }
        let terms: Vec<String> = unique.into_iter().collect();

        if terms.is_empty() {
            return Ok(Self::empty());
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&terms)
            .map_err(|e| LexiconError::Build {
                code: "whitelist".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            terms,
            automaton: Some(automaton),
        })
    }

    /// Parse a whitelist resource: `{ "terms": [...] }`.
    pub fn from_json(origin: &str, json: &str) -> Result<Self, LexiconError> {
        let file: WhitelistFile =
            serde_json::from_str(json).map_err(|source| LexiconError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        Self::new(file.terms)
    }

    /// Merge another whitelist's terms into a new one.
    pub fn merged(&self, other: &Whitelist) -> Result<Self, LexiconError> {
        Self::new(self.terms.iter().chain(other.terms.iter()))
    }

    /// Original-text ranges of every whitelist occurrence in `text`.
    pub fn occurrences(&self, text: &NormalizedText) -> Vec<Range<usize>> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        automaton
            .find_overlapping_iter(text.as_str())
            .filter_map(|m| text.to_original(m.start(), m.end()))
            .collect()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).is_ok()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
