use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::moderation::censor::{is_valid_mask, DEFAULT_MASK};
use crate::moderation::policy::ValidationPolicy;
use crate::scoring::severity::{Severity, SeverityThresholds};

/// Below this many texts, batch_check stays on the calling thread.
pub const DEFAULT_BATCH_PARALLEL_MIN: usize = 64;

/// Central configuration loaded from environment variables.
///
/// Nothing is required: every field has a default, so an empty environment
/// yields a working engine with the built-in lexicons. The .env file is
/// loaded by the binary at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Baseline pack that ends every locale chain (CINDER_DEFAULT_LOCALE)
    pub default_locale: String,
    /// Directory whose *.json packs replace or extend the built-in ones
    /// (CINDER_LEXICON_DIR, else <data dir>/cinder/lexicons when present)
    pub lexicon_dir: Option<PathBuf>,
    /// Character used to censor matches (CINDER_MASK_CHAR)
    pub mask_char: char,
    /// Severity decision-list thresholds (CINDER_SEVERE_MIN_SEVERE, ...)
    pub thresholds: SeverityThresholds,
    /// Policy used when a caller doesn't supply one (CINDER_ALLOW_MILD,
    /// CINDER_BLOCK_THRESHOLD)
    pub default_policy: ValidationPolicy,
    /// Batch size at which batch_check fans out across threads
    /// (CINDER_BATCH_PARALLEL_MIN)
    pub batch_parallel_min: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            lexicon_dir: None,
            mask_char: DEFAULT_MASK,
            thresholds: SeverityThresholds::default(),
            default_policy: ValidationPolicy::default(),
            batch_parallel_min: DEFAULT_BATCH_PARALLEL_MIN,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        if config.lexicon_dir.is_none() {
            config.lexicon_dir = default_lexicon_dir().filter(|dir| dir.is_dir());
        }
        Ok(config)
    }

    /// Build a configuration from an arbitrary key lookup. `load()` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_locale = get("CINDER_DEFAULT_LOCALE")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or(defaults.default_locale);

        let mask_char = match get("CINDER_MASK_CHAR") {
            Some(raw) => parse_mask(&raw)?,
            None => defaults.mask_char,
        };

        let thresholds = SeverityThresholds {
            severe_min_severe: parse_count(
                get("CINDER_SEVERE_MIN_SEVERE"),
                "CINDER_SEVERE_MIN_SEVERE",
                defaults.thresholds.severe_min_severe,
            )?,
            severe_min_combined: parse_count(
                get("CINDER_SEVERE_MIN_COMBINED"),
                "CINDER_SEVERE_MIN_COMBINED",
                defaults.thresholds.severe_min_combined,
            )?,
            moderate_min_combined: parse_count(
                get("CINDER_MODERATE_MIN_COMBINED"),
                "CINDER_MODERATE_MIN_COMBINED",
                defaults.thresholds.moderate_min_combined,
            )?,
            mild_min_total: parse_count(
                get("CINDER_MILD_MIN_TOTAL"),
                "CINDER_MILD_MIN_TOTAL",
                defaults.thresholds.mild_min_total,
            )?,
        };

        let allow_mild = match get("CINDER_ALLOW_MILD").as_deref().map(str::trim) {
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => anyhow::bail!(
                "CINDER_ALLOW_MILD must be true or false, got {other:?}"
            ),
            None => defaults.default_policy.allow_mild,
        };

        let block_threshold = match get("CINDER_BLOCK_THRESHOLD") {
            Some(raw) => raw
                .parse::<Severity>()
                .context("Invalid CINDER_BLOCK_THRESHOLD")?,
            None => defaults.default_policy.block_threshold,
        };

        let batch_parallel_min = parse_count(
            get("CINDER_BATCH_PARALLEL_MIN"),
            "CINDER_BATCH_PARALLEL_MIN",
            defaults.batch_parallel_min,
        )?;

        Ok(Self {
            default_locale,
            lexicon_dir: get("CINDER_LEXICON_DIR").map(PathBuf::from),
            mask_char,
            thresholds,
            default_policy: ValidationPolicy {
                allow_mild,
                block_threshold,
            },
            batch_parallel_min,
        })
    }
}

/// Where lexicon overrides live when CINDER_LEXICON_DIR isn't set.
pub fn default_lexicon_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("cinder").join("lexicons"))
}

fn parse_mask(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_valid_mask(c) => Ok(c),
        (Some(c), None) => anyhow::bail!(
            "CINDER_MASK_CHAR {c:?} is a letter, digit or whitespace and could spell a lexicon term"
        ),
        _ => anyhow::bail!("CINDER_MASK_CHAR must be exactly one character, got {raw:?}"),
    }
}

fn parse_count(raw: Option<String>, key: &str, default: usize) -> Result<usize> {
    match raw {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer, got {v:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.mask_char, '*');
        assert_eq!(config.thresholds, SeverityThresholds::default());
        assert_eq!(config.default_policy, ValidationPolicy::default());
        assert!(config.lexicon_dir.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("CINDER_DEFAULT_LOCALE", "BG"),
            ("CINDER_MASK_CHAR", "#"),
            ("CINDER_MODERATE_MIN_COMBINED", "4"),
            ("CINDER_ALLOW_MILD", "true"),
            ("CINDER_BLOCK_THRESHOLD", "moderate"),
            ("CINDER_LEXICON_DIR", "/srv/lexicons"),
        ])
        .unwrap();
        assert_eq!(config.default_locale, "bg");
        assert_eq!(config.mask_char, '#');
        assert_eq!(config.thresholds.moderate_min_combined, 4);
        assert!(config.default_policy.allow_mild);
        assert_eq!(config.default_policy.block_threshold, Severity::Moderate);
        assert_eq!(config.lexicon_dir, Some(PathBuf::from("/srv/lexicons")));
    }

    #[test]
    fn test_rejects_letter_mask() {
        assert!(config_from(&[("CINDER_MASK_CHAR", "x")]).is_err());
        assert!(config_from(&[("CINDER_MASK_CHAR", "**")]).is_err());
    }

    #[test]
    fn test_rejects_bad_numbers_and_severities() {
        assert!(config_from(&[("CINDER_SEVERE_MIN_COMBINED", "-1")]).is_err());
        assert!(config_from(&[("CINDER_BLOCK_THRESHOLD", "awful")]).is_err());
        assert!(config_from(&[("CINDER_ALLOW_MILD", "maybe")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("CINDER_MASK_CHAR", "  ")]).unwrap();
        assert_eq!(config.mask_char, '*');
    }
}
