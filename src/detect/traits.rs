// Detector trait: the swap-ready matching abstraction.
//
// Every matcher, whether it walks a lexicon automaton or runs regex heuristics,
// implements Detector. The moderator composes the detectors for each language
// in the resolved chain and merges what they return, so a language can swap
// in a different matcher without the facade knowing.

use std::ops::Range;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::lexicon::pack::Tier;
use crate::normalize::NormalizedText;

/// A matched span of the original text.
///
/// `start..end` are byte offsets into the text the caller passed in and always
/// fall on character boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    /// The lexicon term (or pattern label) that matched
    pub term: String,
    pub tier: Tier,
    /// Language code of the pack that produced the match
    pub language: String,
}

impl MatchSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains(&self, other: &MatchSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Trait for finding offensive spans in normalized text.
pub trait Detector: Send + Sync {
    /// Language code this detector belongs to.
    fn language(&self) -> &str;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Scan `text`, returning spans already mapped to original-text offsets.
    fn detect(&self, text: &NormalizedText) -> Result<Vec<MatchSpan>>;
}
