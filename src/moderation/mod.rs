// Moderation facade: the public check / validate / batch_check surface.
//
// A Moderator owns everything a check needs: the lexicon store, the locale
// resolver and one detector set per loaded language. It is immutable after
// construction and shared across threads by reference. The process-wide
// instance lives in a OnceLock and is reached through the free functions at
// the bottom of this file.
//
// Every path out of `check` is fail-open: a detector error or a panic inside
// the pipeline is logged and reported as clean text, so moderation can never
// take down the request that called it.

pub mod censor;
pub mod filter;
pub mod policy;

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use std::thread;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detect::lexicon::LexiconDetector;
use crate::detect::pattern::PatternDetector;
use crate::detect::traits::{Detector, MatchSpan};
use crate::lexicon::store::LexiconStore;
use crate::locale::LocaleResolver;
use crate::normalize::normalize_or_raw;
use crate::output::truncate_chars;
use crate::scoring::severity::{classify, Severity, SeverityThresholds, TierCounts};
use censor::{censor, is_valid_mask, DEFAULT_MASK};
use filter::{fold_contained, remove_whitelisted};
use policy::{ValidationOutcome, ValidationPolicy};

/// How much of the input shows up in debug logs.
const LOG_PREVIEW_CHARS: usize = 60;

/// Outcome of a single `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub has_profanity: bool,
    pub severity: Severity,
    /// Filtered matches, sorted by start offset
    pub matches: Vec<MatchSpan>,
    pub censored_text: String,
    /// First pack of the resolved chain
    pub locale_used: String,
}

impl CheckResult {
    /// A result that reports nothing and echoes the text back.
    pub fn clean(text: &str, locale_used: &str) -> Self {
        Self {
            has_profanity: false,
            severity: Severity::None,
            matches: Vec::new(),
            censored_text: text.to_string(),
            locale_used: locale_used.to_string(),
        }
    }
}

/// The moderation engine.
pub struct Moderator {
    store: LexiconStore,
    resolver: LocaleResolver,
    detectors: Vec<Box<dyn Detector>>,
    thresholds: SeverityThresholds,
    mask: char,
    default_policy: ValidationPolicy,
    batch_parallel_min: usize,
}

impl Moderator {
    /// Build an engine over `store` with the tunables from `config`.
    pub fn new(store: LexiconStore, config: &Config) -> Self {
        let mut detectors: Vec<Box<dyn Detector>> = Vec::new();
        for pack in store.packs() {
            match LexiconDetector::new(pack.clone()) {
                Ok(detector) => detectors.push(Box::new(detector)),
                Err(e) => {
                    warn!(pack = pack.code(), error = %e, "Lexicon detector unavailable, pack degraded to empty")
                }
            }
            match PatternDetector::for_language(pack.code()) {
                Ok(Some(detector)) => detectors.push(Box::new(detector)),
                Ok(None) => {}
                Err(e) => {
                    warn!(pack = pack.code(), error = %e, "Pattern heuristics unavailable for pack")
                }
            }
        }

        let resolver = LocaleResolver::new(store.codes(), &config.default_locale);
        if store.pack(resolver.default_code()).is_none() {
            warn!(
                locale = resolver.default_code(),
                "Default locale has no language pack; baseline coverage is empty"
            );
        }

        let mask = if is_valid_mask(config.mask_char) {
            config.mask_char
        } else {
            warn!(mask = %config.mask_char, "Unusable mask character, falling back to '{DEFAULT_MASK}'");
            DEFAULT_MASK
        };

        info!(
            packs = store.codes().len(),
            detectors = detectors.len(),
            default_locale = resolver.default_code(),
            "Moderation engine ready"
        );

        Self {
            store,
            resolver,
            detectors,
            thresholds: config.thresholds,
            mask,
            default_policy: config.default_policy,
            batch_parallel_min: config.batch_parallel_min,
        }
    }

    /// Built-in lexicons with default tunables.
    pub fn builtin() -> Self {
        Self::new(LexiconStore::builtin(), &Config::default())
    }

    /// Add a detector alongside the built-in ones. It runs whenever its
    /// language appears in a resolved chain.
    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn store(&self) -> &LexiconStore {
        &self.store
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    pub fn default_policy(&self) -> &ValidationPolicy {
        &self.default_policy
    }

    /// Detect, classify and censor offensive content in `text`.
    ///
    /// Never panics outward. Any internal fault yields a clean result.
    pub fn check(&self, text: &str, locale: &str) -> CheckResult {
        let chain = self.resolver.resolve(locale);
        let locale_used = chain
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.resolver.default_code());

        if text.trim().is_empty() {
            return CheckResult::clean(text, locale_used);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.run(text, &chain))) {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(error = %format!("{e:#}"), locale = locale_used, "Moderation check failed, treating text as clean");
                CheckResult::clean(text, locale_used)
            }
            Err(_) => {
                warn!(locale = locale_used, "Moderation check panicked, treating text as clean");
                CheckResult::clean(text, locale_used)
            }
        }
    }

    /// Decide whether `text` may be accepted under `policy`.
    pub fn validate(&self, text: &str, locale: &str, policy: &ValidationPolicy) -> ValidationOutcome {
        let result = self.check(text, locale);
        let outcome = ValidationOutcome::evaluate(result.severity, policy);
        if !outcome.valid {
            debug!(
                severity = %outcome.severity,
                locale = %result.locale_used,
                "Submission rejected"
            );
        }
        outcome
    }

    /// `validate` with the configured default policy.
    pub fn validate_default(&self, text: &str, locale: &str) -> ValidationOutcome {
        self.validate(text, locale, &self.default_policy)
    }

    /// Check many texts against one locale. Results keep input order.
    pub fn batch_check<S>(&self, texts: &[S], locale: &str) -> Vec<CheckResult>
    where
        S: AsRef<str> + Sync,
    {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        if texts.len() < self.batch_parallel_min.max(2) || workers < 2 {
            return texts.iter().map(|t| self.check(t.as_ref(), locale)).collect();
        }

        let chunk_size = texts.len().div_ceil(workers);
        debug!(texts = texts.len(), workers, chunk_size, "Fanning out batch check");

        thread::scope(|scope| {
            let handles: Vec<_> = texts
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|t| self.check(t.as_ref(), locale))
                            .collect::<Vec<_>>()
                    });
                    (chunk, handle)
                })
                .collect();

            let mut results = Vec::with_capacity(texts.len());
            for (chunk, handle) in handles {
                match handle.join() {
                    Ok(chunk_results) => results.extend(chunk_results),
                    Err(_) => {
                        warn!(texts = chunk.len(), "Batch worker died, reporting its chunk as clean");
                        let used = self.resolver.resolve(locale);
                        let used = used.first().map(String::as_str).unwrap_or_default();
                        results.extend(chunk.iter().map(|t| CheckResult::clean(t.as_ref(), used)));
                    }
                }
            }
            results
        })
    }

    fn run(&self, text: &str, chain: &[String]) -> Result<CheckResult> {
        let primary = chain
            .first()
            .context("Locale chain is empty")?;
        let hint = self
            .store
            .pack(primary)
            .map(|p| p.script())
            .unwrap_or_default();
        let normalized = normalize_or_raw(text, hint).with_mask(self.mask);

        let mut matches = Vec::new();
        for code in chain {
            for detector in self.detectors.iter().filter(|d| d.language() == code) {
                let found = detector
                    .detect(&normalized)
                    .with_context(|| format!("{} detector for '{code}' failed", detector.name()))?;
                matches.extend(found);
            }
        }

        let protected = self.store.whitelist().occurrences(&normalized);
        let matches = fold_contained(remove_whitelisted(matches, &protected));
        let counts = TierCounts::from_matches(&matches);
        let severity = classify(&counts, &self.thresholds);
        let censored_text = censor(text, &matches, self.mask);

        debug!(
            preview = %truncate_chars(text, LOG_PREVIEW_CHARS),
            chain = %chain.join(">"),
            matches = matches.len(),
            severe = counts.severe,
            moderate = counts.moderate,
            mild = counts.mild,
            severity = %severity,
            "Checked text"
        );

        Ok(CheckResult {
            has_profanity: !matches.is_empty(),
            severity,
            matches,
            censored_text,
            locale_used: primary.clone(),
        })
    }
}

static ENGINE: OnceLock<Moderator> = OnceLock::new();

/// Initialize the process-wide engine from `config`.
///
/// Only the first initialization takes effect; later calls (or a call after
/// `engine()` already lazily initialized) return the existing engine.
pub fn init(config: &Config) -> &'static Moderator {
    if let Some(existing) = ENGINE.get() {
        warn!("Moderation engine already initialized, ignoring new configuration");
        return existing;
    }
    ENGINE.get_or_init(|| {
        let store = LexiconStore::load(config.lexicon_dir.as_deref());
        Moderator::new(store, config)
    })
}

/// The process-wide engine, built from the compiled-in lexicons and default
/// tunables if `init` was never called.
pub fn engine() -> &'static Moderator {
    ENGINE.get_or_init(Moderator::builtin)
}

/// `Moderator::check` on the process-wide engine.
pub fn check(text: &str, locale: &str) -> CheckResult {
    engine().check(text, locale)
}

/// `Moderator::validate` on the process-wide engine.
pub fn validate(text: &str, locale: &str, policy: &ValidationPolicy) -> ValidationOutcome {
    engine().validate(text, locale, policy)
}

/// `Moderator::batch_check` on the process-wide engine.
pub fn batch_check<S>(texts: &[S], locale: &str) -> Vec<CheckResult>
where
    S: AsRef<str> + Sync,
{
    engine().batch_check(texts, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::pack::{LanguagePack, Tier};
    use crate::lexicon::whitelist::Whitelist;
    use crate::normalize::NormalizedText;

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn language(&self) -> &str {
            "en"
        }

        fn name(&self) -> &'static str {
            "failing"
        }

        fn detect(&self, _text: &NormalizedText) -> Result<Vec<MatchSpan>> {
            anyhow::bail!("detector exploded")
        }
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn language(&self) -> &str {
            "en"
        }

        fn name(&self) -> &'static str {
            "panicking"
        }

        fn detect(&self, _text: &NormalizedText) -> Result<Vec<MatchSpan>> {
            panic!("detector panicked")
        }
    }

    fn small_engine() -> Moderator {
        let pack = LanguagePack::from_json(
            "test",
            r#"{"code":"en","script":"latin","tiers":{"severe":["grumble"],"moderate":["snark"],"mild":["meh"]}}"#,
        )
        .unwrap();
        let store = LexiconStore::from_parts(vec![pack], Whitelist::new(["snarky"]).unwrap());
        Moderator::new(store, &Config::default())
    }

    #[test]
    fn test_check_reports_and_censors() {
        let result = small_engine().check("such snark today", "en");
        assert!(result.has_profanity);
        assert_eq!(result.severity, Severity::Mild);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].tier, Tier::Moderate);
        assert_eq!(result.censored_text, "such ***** today");
    }

    #[test]
    fn test_whitelisted_word_is_clean() {
        let result = small_engine().check("how snarky", "en");
        assert!(!result.has_profanity);
        assert_eq!(result.censored_text, "how snarky");
    }

    #[test]
    fn test_detector_error_fails_open() {
        let engine = small_engine().with_detector(Box::new(FailingDetector));
        let result = engine.check("grumble grumble", "en");
        assert_eq!(result, CheckResult::clean("grumble grumble", "en"));
    }

    #[test]
    fn test_detector_panic_fails_open() {
        let engine = small_engine().with_detector(Box::new(PanickingDetector));
        let result = engine.check("grumble", "en");
        assert!(!result.has_profanity);
        assert_eq!(result.severity, Severity::None);
    }

    #[test]
    fn test_validate_uses_policy() {
        let engine = small_engine();
        let lenient = ValidationPolicy {
            allow_mild: true,
            block_threshold: Severity::Mild,
        };
        assert!(engine.validate("meh", "en", &lenient).valid);
        assert!(!engine.validate_default("meh", "en").valid);
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let config = Config {
            batch_parallel_min: 2,
            ..Config::default()
        };
        let pack = LanguagePack::from_json(
            "test",
            r#"{"code":"en","script":"latin","tiers":{"severe":["grumble"],"moderate":[],"mild":[]}}"#,
        )
        .unwrap();
        let engine = Moderator::new(LexiconStore::from_parts(vec![pack], Whitelist::empty()), &config);
        let texts: Vec<String> = (0..50)
            .map(|i| if i % 3 == 0 { format!("grumble {i}") } else { format!("fine {i}") })
            .collect();
        let parallel = engine.batch_check(&texts, "en");
        let sequential: Vec<_> = texts.iter().map(|t| engine.check(t, "en")).collect();
        assert_eq!(parallel, sequential);
    }
}
