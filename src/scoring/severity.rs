// Severity classification from match counts.
//
// A first-match-wins decision list over how many severe, moderate and mild
// matches survived filtering. The thresholds are policy, not algorithm, so
// they live in SeverityThresholds and can be tuned per deployment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::traits::MatchSpan;
use crate::lexicon::pack::Tier;

/// Severe matches needed to classify as severe on their own.
pub const SEVERE_MIN_SEVERE: usize = 1;
/// Severe + moderate matches needed to classify as severe.
pub const SEVERE_MIN_COMBINED: usize = 3;
/// Severe + moderate matches needed to classify as moderate.
pub const MODERATE_MIN_COMBINED: usize = 2;
/// Matches of any tier needed to classify as mild.
pub const MILD_MIN_TOTAL: usize = 1;

/// Overall severity of a checked text. Ordered none < mild < moderate < severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown severity {0:?} (expected none, mild, moderate or severe)")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Severity::None),
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Per-tier match counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub severe: usize,
    pub moderate: usize,
    pub mild: usize,
}

impl TierCounts {
    pub fn from_matches(matches: &[MatchSpan]) -> Self {
        let mut counts = Self::default();
        for m in matches {
            match m.tier {
                Tier::Severe => counts.severe += 1,
                Tier::Moderate => counts.moderate += 1,
                Tier::Mild => counts.mild += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.severe + self.moderate + self.mild
    }
}

/// Tunable thresholds for the severity decision list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityThresholds {
    pub severe_min_severe: usize,
    pub severe_min_combined: usize,
    pub moderate_min_combined: usize,
    pub mild_min_total: usize,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            severe_min_severe: SEVERE_MIN_SEVERE,
            severe_min_combined: SEVERE_MIN_COMBINED,
            moderate_min_combined: MODERATE_MIN_COMBINED,
            mild_min_total: MILD_MIN_TOTAL,
        }
    }
}

/// Classify match counts. Rules are checked top to bottom, first hit wins.
pub fn classify(counts: &TierCounts, thresholds: &SeverityThresholds) -> Severity {
    let combined = counts.severe + counts.moderate;
    if counts.severe >= thresholds.severe_min_severe
        || combined >= thresholds.severe_min_combined
    {
        Severity::Severe
    } else if combined >= thresholds.moderate_min_combined {
        Severity::Moderate
    } else if counts.total() >= thresholds.mild_min_total {
        Severity::Mild
    } else {
        Severity::None
    }
}
