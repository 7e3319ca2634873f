// Validation policy: turn a severity into an accept/reject decision.

use serde::{Deserialize, Serialize};

use crate::scoring::severity::Severity;

/// Caller-supplied rules for `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Let exactly-mild text through regardless of the threshold
    pub allow_mild: bool,
    /// Lowest severity that gets blocked
    pub block_threshold: Severity,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allow_mild: false,
            block_threshold: Severity::Mild,
        }
    }
}

impl ValidationPolicy {
    /// Whether text at `severity` passes this policy.
    ///
    /// Clean text always passes. Otherwise text is blocked once its severity
    /// reaches the threshold, unless it is exactly mild and mild is allowed.
    pub fn permits(&self, severity: Severity) -> bool {
        if severity == Severity::None {
            return true;
        }
        if self.allow_mild && severity == Severity::Mild {
            return true;
        }
        severity < self.block_threshold
    }
}

/// Result of `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub severity: Severity,
    /// Translation key for the error shown to the user; only set when invalid
    pub message_key: Option<&'static str>,
}

impl ValidationOutcome {
    pub fn evaluate(severity: Severity, policy: &ValidationPolicy) -> Self {
        let valid = policy.permits(severity);
        Self {
            valid,
            severity,
            message_key: (!valid).then(|| message_key(severity)),
        }
    }
}

/// Severity-specific translation key for a blocked submission.
pub fn message_key(severity: Severity) -> &'static str {
    match severity {
        Severity::None => "moderation.blocked.none",
        Severity::Mild => "moderation.blocked.mild",
        Severity::Moderate => "moderation.blocked.moderate",
        Severity::Severe => "moderation.blocked.severe",
    }
}
