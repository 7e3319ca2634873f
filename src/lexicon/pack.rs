// Language packs: per-language term lists partitioned into severity tiers.
//
// Packs are parsed from JSON. Each entry is run through the same normalizer
// the checked text goes through, so a term listed as "Scheiße" or "чёрт"
// matches whatever the normalizer turns user input into. Entries that can't
// be used are dropped here, at load time, never at match time.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LexiconError, MatchFault};
use crate::normalize::normalize_or_raw;
use crate::normalize::obfuscation::Script;

/// Minimum normalized length of a lexicon term, in characters.
pub const MIN_TERM_CHARS: usize = 2;

/// Severity bucket of a lexicon term. Ordered mild < moderate < severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Mild,
    Moderate,
    Severe,
}

impl Tier {
    /// Tiers in the order they are loaded and scanned.
    pub const BY_PRIORITY: [Tier; 3] = [Tier::Severe, Tier::Moderate, Tier::Mild];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Mild => "mild",
            Tier::Moderate => "moderate",
            Tier::Severe => "severe",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One usable lexicon term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Normalized form, the thing the matchers search for
    pub text: String,
    /// The entry as written in the lexicon file
    pub source: String,
    pub tier: Tier,
    /// Only match when not glued to other letters or digits
    pub whole_word: bool,
}

/// An immutable set of terms for one language.
#[derive(Debug, Clone)]
pub struct LanguagePack {
    code: String,
    script: Script,
    terms: Vec<Term>,
}

/// A lexicon entry as it appears on disk: either a bare string or an object
/// carrying matching flags.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TermEntry {
    Plain(String),
    Detailed {
        term: String,
        #[serde(default)]
        whole_word: bool,
        #[serde(default)]
        always_match: bool,
    },
}

#[derive(Debug, Deserialize)]
struct PackFile {
    code: String,
    #[serde(default)]
    script: Script,
    #[serde(default)]
    tiers: TierLists,
}

// Entries stay as raw JSON values until each one is checked individually,
// so one bad entry doesn't take the whole pack down.
#[derive(Debug, Default, Deserialize)]
struct TierLists {
    #[serde(default)]
    severe: Vec<serde_json::Value>,
    #[serde(default)]
    moderate: Vec<serde_json::Value>,
    #[serde(default)]
    mild: Vec<serde_json::Value>,
}

impl TierLists {
    fn entries(&self, tier: Tier) -> &[serde_json::Value] {
        match tier {
            Tier::Severe => &self.severe,
            Tier::Moderate => &self.moderate,
            Tier::Mild => &self.mild,
        }
    }
}

impl LanguagePack {
    /// A pack with no terms. Used when a resource fails to load.
    pub fn empty(code: &str, script: Script) -> Self {
        Self {
            code: code.to_string(),
            script,
            terms: Vec::new(),
        }
    }

    /// Parse a pack from its JSON resource.
    ///
    /// `origin` names the resource in log messages and errors. Unusable
    /// entries are skipped with a warning; only a structurally broken file
    /// is an error.
    pub fn from_json(origin: &str, json: &str) -> Result<Self, LexiconError> {
        let file: PackFile =
            serde_json::from_str(json).map_err(|source| LexiconError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        let code = file.code.trim().to_lowercase();
        if code.is_empty() {
            return Err(LexiconError::MissingCode {
                origin: origin.to_string(),
            });
        }

        let mut terms = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for tier in Tier::BY_PRIORITY {
            for value in file.tiers.entries(tier) {
                let entry = match serde_json::from_value::<TermEntry>(value.clone()) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(pack = %code, %tier, entry = %value, error = %e, "Skipping malformed lexicon entry");
                        skipped += 1;
                        continue;
                    }
                };
                match prepare_term(entry, tier, file.script) {
                    // A term listed in two tiers keeps the more severe one
                    Ok(term) => {
                        if seen.insert(term.text.clone()) {
                            terms.push(term);
                        }
                    }
                    Err(fault) => {
                        warn!(pack = %code, %tier, error = %fault, "Skipping unusable lexicon entry");
                        skipped += 1;
                    }
                }
            }
        }

        debug!(pack = %code, terms = terms.len(), skipped, "Parsed language pack");

        Ok(Self {
            code,
            script: file.script,
            terms,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn tier_terms(&self, tier: Tier) -> impl Iterator<Item = &Term> {
        self.terms.iter().filter(move |t| t.tier == tier)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn prepare_term(entry: TermEntry, tier: Tier, script: Script) -> Result<Term, MatchFault> {
    let (source, whole_word, always_match) = match entry {
        TermEntry::Plain(term) => (term, false, false),
        TermEntry::Detailed {
            term,
            whole_word,
            always_match,
        } => (term, whole_word, always_match),
    };

    let text = normalize_or_raw(source.trim(), script).as_str().to_string();

    if text.is_empty() {
        return Err(MatchFault::Empty { term: source });
    }
    if !text.chars().any(|c| c.is_alphanumeric()) {
        return Err(MatchFault::NoWordCharacters { term: source });
    }
    if text.chars().count() < MIN_TERM_CHARS && !always_match {
        return Err(MatchFault::TooShort {
            term: source,
            min: MIN_TERM_CHARS,
        });
    }

    Ok(Term {
        text,
        source,
        tier,
        whole_word,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_and_detailed_entries() {
        let json = r#"{
            "code": "EN",
            "tiers": {
                "severe": ["Badword"],
                "mild": [{"term": "meh", "whole_word": true}]
            }
        }"#;
        let pack = LanguagePack::from_json("test", json).unwrap();
        assert_eq!(pack.code(), "en");
        assert_eq!(pack.len(), 2);
        let severe: Vec<_> = pack.tier_terms(Tier::Severe).collect();
        assert_eq!(severe[0].text, "badword");
        assert_eq!(severe[0].source, "Badword");
        let mild: Vec<_> = pack.tier_terms(Tier::Mild).collect();
        assert!(mild[0].whole_word);
    }

    #[test]
    fn test_short_terms_rejected_unless_always_match() {
        let json = r#"{
            "code": "xx",
            "tiers": { "mild": ["a", {"term": "b", "always_match": true}, "", "***"] }
        }"#;
        let pack = LanguagePack::from_json("test", json).unwrap();
        let texts: Vec<_> = pack.terms().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["b"]);
    }

    #[test]
    fn test_malformed_entry_skipped_not_fatal() {
        let json = r#"{ "code": "xx", "tiers": { "moderate": [42, "fine"] } }"#;
        let pack = LanguagePack::from_json("test", json).unwrap();
        assert_eq!(pack.len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_most_severe_tier() {
        let json = r#"{ "code": "xx", "tiers": { "mild": ["dup"], "severe": ["dup"] } }"#;
        let pack = LanguagePack::from_json("test", json).unwrap();
        assert_eq!(pack.len(), 1);
        assert_eq!(pack.terms()[0].tier, Tier::Severe);
    }

    #[test]
    fn test_obfuscated_entry_is_normalized() {
        let json = r#"{ "code": "xx", "tiers": { "mild": ["$tup1d"] } }"#;
        let pack = LanguagePack::from_json("test", json).unwrap();
        assert_eq!(pack.terms()[0].text, "stupid");
    }

    #[test]
    fn test_broken_json_is_error() {
        assert!(matches!(
            LanguagePack::from_json("test", "{ nope"),
            Err(LexiconError::Parse { .. })
        ));
        assert!(matches!(
            LanguagePack::from_json("test", r#"{ "code": " " }"#),
            Err(LexiconError::MissingCode { .. })
        ));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Mild < Tier::Moderate);
        assert!(Tier::Moderate < Tier::Severe);
    }
}
