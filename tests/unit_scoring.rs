// Unit tests for severity classification and validation policy.
//
// Tests isolated pure functions: the classify decision list at each
// boundary, custom thresholds, Severity parsing/ordering, and the
// validate accept/reject grid.

use cinder::moderation::policy::{message_key, ValidationOutcome, ValidationPolicy};
use cinder::scoring::severity::{classify, Severity, SeverityThresholds, TierCounts};

fn counts(severe: usize, moderate: usize, mild: usize) -> TierCounts {
    TierCounts {
        severe,
        moderate,
        mild,
    }
}

fn level(severe: usize, moderate: usize, mild: usize) -> Severity {
    classify(&counts(severe, moderate, mild), &SeverityThresholds::default())
}

// ============================================================
// classify: decision list boundaries
// ============================================================

#[test]
fn nothing_is_none() {
    assert_eq!(level(0, 0, 0), Severity::None);
}

#[test]
fn single_severe_is_severe() {
    assert_eq!(level(1, 0, 0), Severity::Severe);
}

#[test]
fn three_moderate_is_severe() {
    assert_eq!(level(0, 3, 0), Severity::Severe);
}

#[test]
fn two_moderate_is_moderate() {
    assert_eq!(level(0, 2, 0), Severity::Moderate);
}

#[test]
fn single_moderate_is_mild() {
    assert_eq!(level(0, 1, 0), Severity::Mild);
}

#[test]
fn single_mild_is_mild() {
    assert_eq!(level(0, 0, 1), Severity::Mild);
}

#[test]
fn many_mild_stay_mild() {
    // Mild matches never count toward the combined thresholds
    assert_eq!(level(0, 0, 25), Severity::Mild);
}

#[test]
fn one_moderate_plus_mild_is_mild() {
    assert_eq!(level(0, 1, 5), Severity::Mild);
}

#[test]
fn severe_wins_regardless_of_others() {
    assert_eq!(level(1, 1, 1), Severity::Severe);
}

// ============================================================
// classify: custom thresholds
// ============================================================

#[test]
fn stricter_moderate_threshold() {
    let thresholds = SeverityThresholds {
        moderate_min_combined: 1,
        ..SeverityThresholds::default()
    };
    assert_eq!(classify(&counts(0, 1, 0), &thresholds), Severity::Moderate);
}

#[test]
fn lenient_severe_threshold() {
    let thresholds = SeverityThresholds {
        severe_min_severe: 2,
        severe_min_combined: 5,
        ..SeverityThresholds::default()
    };
    assert_eq!(classify(&counts(1, 0, 0), &thresholds), Severity::Mild);
    assert_eq!(classify(&counts(1, 1, 0), &thresholds), Severity::Moderate);
    assert_eq!(classify(&counts(2, 0, 0), &thresholds), Severity::Severe);
}

#[test]
fn default_thresholds_match_constants() {
    let t = SeverityThresholds::default();
    assert_eq!(t.severe_min_severe, 1);
    assert_eq!(t.severe_min_combined, 3);
    assert_eq!(t.moderate_min_combined, 2);
    assert_eq!(t.mild_min_total, 1);
}

#[test]
fn tier_counts_total() {
    assert_eq!(counts(1, 2, 3).total(), 6);
}

// ============================================================
// Severity: ordering, parsing, display
// ============================================================

#[test]
fn severity_ordering() {
    assert!(Severity::None < Severity::Mild);
    assert!(Severity::Mild < Severity::Moderate);
    assert!(Severity::Moderate < Severity::Severe);
}

#[test]
fn severity_parses_case_insensitively() {
    assert_eq!("Moderate".parse::<Severity>().unwrap(), Severity::Moderate);
    assert_eq!(" severe ".parse::<Severity>().unwrap(), Severity::Severe);
    assert!("terrible".parse::<Severity>().is_err());
}

#[test]
fn severity_display_round_trips() {
    for s in [
        Severity::None,
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
    ] {
        assert_eq!(s.to_string().parse::<Severity>().unwrap(), s);
    }
}

#[test]
fn severity_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&Severity::Moderate).unwrap(),
        "\"moderate\""
    );
}

// ============================================================
// ValidationPolicy: accept/reject grid
// ============================================================

#[test]
fn clean_always_valid() {
    for threshold in [Severity::Mild, Severity::Moderate, Severity::Severe] {
        let policy = ValidationPolicy {
            allow_mild: false,
            block_threshold: threshold,
        };
        assert!(policy.permits(Severity::None));
    }
}

#[test]
fn reaching_threshold_blocks() {
    let policy = ValidationPolicy {
        allow_mild: false,
        block_threshold: Severity::Moderate,
    };
    assert!(policy.permits(Severity::Mild));
    assert!(!policy.permits(Severity::Moderate));
    assert!(!policy.permits(Severity::Severe));
}

#[test]
fn allow_mild_does_not_exempt_moderate() {
    let policy = ValidationPolicy {
        allow_mild: true,
        block_threshold: Severity::Mild,
    };
    assert!(policy.permits(Severity::Mild));
    assert!(!policy.permits(Severity::Moderate));
}

#[test]
fn outcome_carries_severity_specific_key() {
    let outcome = ValidationOutcome::evaluate(Severity::Severe, &ValidationPolicy::default());
    assert!(!outcome.valid);
    assert_eq!(outcome.message_key, Some("moderation.blocked.severe"));
    assert_eq!(message_key(Severity::Mild), "moderation.blocked.mild");
}

#[test]
fn valid_outcome_has_no_key() {
    let outcome = ValidationOutcome::evaluate(Severity::None, &ValidationPolicy::default());
    assert!(outcome.valid);
    assert!(outcome.message_key.is_none());
}
