// Pattern detector: regex heuristics for inflected and compounded forms.
//
// Lexicons list stems; these patterns catch what grows off them ("fucking",
// "shitty", "наебал", "курвата") so the whole word gets masked rather than
// just the stem. They run on normalized text, which is already lowercase and
// de-obfuscated. regex-lite has no Unicode word boundaries, so anchoring is
// checked by hand against the normalized text.

use anyhow::Result;
use regex_lite::Regex;

use super::traits::{Detector, MatchSpan};
use crate::error::LexiconError;
use crate::lexicon::pack::Tier;
use crate::normalize::NormalizedText;

/// Where a pattern must sit relative to surrounding letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Anywhere, even mid-word
    Free,
    /// Must begin a word
    WordStart,
    /// Must be a whole word
    Word,
}

/// (label, regex, tier, anchor)
type PatternDef = (&'static str, &'static str, Tier, Anchor);

const ENGLISH: &[PatternDef] = &[
    ("fuck", r"f+u+c+k+[a-z]*", Tier::Severe, Anchor::WordStart),
    (
        "shit",
        r"s+h+i+t+(?:s|ty|head|hole|bag|face|storm)?",
        Tier::Moderate,
        Anchor::WordStart,
    ),
    ("bitch", r"b+i+t+c+h+(?:es|ing|y)?", Tier::Moderate, Anchor::WordStart),
    ("ass", r"a+s+s+(?:hole|hat|wipe|clown)s?", Tier::Moderate, Anchor::WordStart),
    ("dick", r"dick(?:head|wad|face)s?", Tier::Moderate, Anchor::WordStart),
];

const BULGARIAN: &[PatternDef] = &[
    ("курва", r"курв[а-я]*", Tier::Severe, Anchor::WordStart),
    (
        "еба",
        r"(?:на|за|из|по|до)?еб(?:ах|еш|ан|ал|ат|ем)[а-я]*",
        Tier::Severe,
        Anchor::WordStart,
    ),
    ("шибан", r"шибан[а-я]*", Tier::Moderate, Anchor::WordStart),
];

const RUSSIAN: &[PatternDef] = &[
    ("хуй", r"(?:на|по|от|за)?ху[йяеи][а-я]*", Tier::Severe, Anchor::WordStart),
    ("пизда", r"[а-я]*пизд[а-я]*", Tier::Severe, Anchor::Free),
    ("блядь", r"бля[дт][а-я]*", Tier::Severe, Anchor::WordStart),
    (
        "ебать",
        r"(?:за|на|по|от|вы|у|до|при|раз)?еб(?:ал|ан|ат|ну|ут|ись)[а-я]*",
        Tier::Severe,
        Anchor::WordStart,
    ),
    ("сука", r"сук(?:а|и|ой|у|е|ин[а-я]*)", Tier::Moderate, Anchor::Word),
];

pub struct PatternDetector {
    language: String,
    patterns: Vec<Pattern>,
}

struct Pattern {
    label: &'static str,
    regex: Regex,
    tier: Tier,
    anchor: Anchor,
}

impl PatternDetector {
    /// Built-in heuristics for a language, or `None` if it has none.
    pub fn for_language(code: &str) -> Result<Option<Self>, LexiconError> {
        let defs = match code {
            "en" => ENGLISH,
            "bg" => BULGARIAN,
            "ru" => RUSSIAN,
            _ => return Ok(None),
        };
        Self::from_defs(code, defs).map(Some)
    }

    fn from_defs(code: &str, defs: &[PatternDef]) -> Result<Self, LexiconError> {
        let patterns = defs
            .iter()
            .map(|&(label, source, tier, anchor)| {
                Regex::new(source)
                    .map(|regex| Pattern {
                        label,
                        regex,
                        tier,
                        anchor,
                    })
                    .map_err(|e| LexiconError::Build {
                        code: code.to_string(),
                        reason: format!("pattern {label}: {e}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            language: code.to_string(),
            patterns,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Detector for PatternDetector {
    fn language(&self) -> &str {
        &self.language
    }

    fn name(&self) -> &'static str {
        "pattern"
    }

    fn detect(&self, text: &NormalizedText) -> Result<Vec<MatchSpan>> {
        let mut spans = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text.as_str()) {
                if m.start() == m.end() {
                    continue;
                }
                let anchored = match pattern.anchor {
                    Anchor::Free => true,
                    Anchor::WordStart => text.is_boundary_before(m.start()),
                    Anchor::Word => {
                        text.is_boundary_before(m.start()) && text.is_boundary_after(m.end())
                    }
                };
                if !anchored {
                    continue;
                }
                if let Some(range) = text.to_original(m.start(), m.end()) {
                    spans.push(MatchSpan {
                        start: range.start,
                        end: range.end,
                        term: pattern.label.to_string(),
                        tier: pattern.tier,
                        language: self.language.clone(),
                    });
                }
            }
        }
        Ok(spans)
    }
}
