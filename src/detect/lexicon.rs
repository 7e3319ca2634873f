// Lexicon detector: one Aho-Corasick automaton per language pack.
//
// Leftmost-longest semantics: at any position the longest listed term wins,
// and matches never overlap within one pack. "bullshit" is reported once as
// "bullshit", not again as "shit".

use std::sync::Arc;

use aho_corasick::{AhoCorasick, MatchKind};
use anyhow::Result;
use tracing::warn;

use super::traits::{Detector, MatchSpan};
use crate::error::LexiconError;
use crate::lexicon::pack::LanguagePack;
use crate::normalize::NormalizedText;

pub struct LexiconDetector {
    pack: Arc<LanguagePack>,
    // None for an empty pack
    automaton: Option<AhoCorasick>,
}

impl LexiconDetector {
    pub fn new(pack: Arc<LanguagePack>) -> Result<Self, LexiconError> {
        if pack.is_empty() {
            return Ok(Self {
                pack,
                automaton: None,
            });
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(pack.terms().iter().map(|t| t.text.as_str()))
            .map_err(|e| LexiconError::Build {
                code: pack.code().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            pack,
            automaton: Some(automaton),
        })
    }
}

impl Detector for LexiconDetector {
    fn language(&self) -> &str {
        self.pack.code()
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn detect(&self, text: &NormalizedText) -> Result<Vec<MatchSpan>> {
        let Some(automaton) = &self.automaton else {
            return Ok(Vec::new());
        };

        let mut spans = Vec::new();
        for m in automaton.find_iter(text.as_str()) {
            let term = &self.pack.terms()[m.pattern().as_usize()];
            if term.whole_word
                && !(text.is_boundary_before(m.start()) && text.is_boundary_after(m.end()))
            {
                continue;
            }
            let Some(range) = text.to_original(m.start(), m.end()) else {
                warn!(
                    pack = self.pack.code(),
                    term = %term.source,
                    start = m.start(),
                    end = m.end(),
                    "Match could not be mapped back to the original text, skipping"
                );
                continue;
            };
            spans.push(MatchSpan {
                start: range.start,
                end: range.end,
                term: term.source.clone(),
                tier: term.tier,
                language: self.pack.code().to_string(),
            });
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::pack::Tier;
    use crate::normalize::normalize;
    use crate::normalize::obfuscation::Script;

    fn detector(json: &str) -> LexiconDetector {
        let pack = LanguagePack::from_json("test", json).unwrap();
        LexiconDetector::new(Arc::new(pack)).unwrap()
    }

    #[test]
    fn test_longest_term_wins() {
        let d = detector(r#"{ "code": "en", "tiers": { "moderate": ["shit", "bullshit"] } }"#);
        let text = normalize("total bullshit", Script::Latin).unwrap();
        let spans = d.detect(&text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].term, "bullshit");
        assert_eq!(spans[0].range(), 6..14);
        assert_eq!(spans[0].tier, Tier::Moderate);
    }

    #[test]
    fn test_whole_word_respects_boundaries() {
        let d = detector(r#"{ "code": "en", "tiers": { "mild": [{"term": "ass", "whole_word": true}] } }"#);
        let inside = normalize("first class pass", Script::Latin).unwrap();
        assert!(d.detect(&inside).unwrap().is_empty());
        let alone = normalize("what an ass.", Script::Latin).unwrap();
        assert_eq!(d.detect(&alone).unwrap().len(), 1);
    }

    #[test]
    fn test_obfuscated_match_maps_to_original_span() {
        let d = detector(r#"{ "code": "en", "tiers": { "moderate": ["shit"] } }"#);
        let original = "oh $.h.1.t no";
        let text = normalize(original, Script::Latin).unwrap();
        let spans = d.detect(&text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(&original[spans[0].range()], "$.h.1.t");
    }

    #[test]
    fn test_empty_pack_detects_nothing() {
        let d = LexiconDetector::new(Arc::new(LanguagePack::empty("xx", Script::Latin))).unwrap();
        let text = normalize("anything at all", Script::Latin).unwrap();
        assert!(d.detect(&text).unwrap().is_empty());
    }
}
