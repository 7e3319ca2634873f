// Locale resolution: requested locale to an ordered chain of language packs.
//
// Callers pass whatever the request carried: "en", "en-US", "bg_BG", "BG",
// an empty string, or garbage. We pull out the primary language subtag, add
// closely related packs, and always finish with the default baseline so
// unrecognized locales still get coverage.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Languages that should also be checked against a related pack.
/// Listed as (requested primary subtag, related pack codes in priority order).
const AFFINITIES: &[(&str, &[&str])] = &[
    ("mk", &["bg"]),
    ("uk", &["ru"]),
    ("be", &["ru"]),
    ("kk", &["ru"]),
    ("ky", &["ru"]),
    ("gsw", &["de"]),
    ("lb", &["de"]),
    ("ca", &["es"]),
    ("gl", &["es"]),
];

static PRIMARY_SUBTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z]{2,3})(?:[-_][A-Za-z0-9]{1,8})*\s*$")
        .expect("primary subtag regex failed to compile")
});

/// Maps locales to pack chains. Cheap to clone, immutable once built.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    supported: BTreeSet<String>,
    default: String,
}

impl LocaleResolver {
    /// `supported` is the set of loaded pack codes; `default` is the baseline
    /// that ends every chain.
    pub fn new<I, S>(supported: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: supported.into_iter().map(Into::into).collect(),
            default: default.trim().to_lowercase(),
        }
    }

    pub fn default_code(&self) -> &str {
        &self.default
    }

    /// Resolve `locale` to a deduplicated chain, most authoritative first.
    /// Never empty: the default baseline is always last.
    pub fn resolve(&self, locale: &str) -> Vec<String> {
        let mut chain: Vec<String> = Vec::with_capacity(3);
        let mut push = |code: &str| {
            if !chain.iter().any(|c| c == code) {
                chain.push(code.to_string());
            }
        };

        if let Some(primary) = primary_subtag(locale) {
            if self.supported.contains(&primary) {
                push(primary.as_str());
            }
            if let Some((_, related)) = AFFINITIES.iter().find(|(code, _)| *code == primary) {
                for code in related.iter().filter(|c| self.supported.contains(**c)) {
                    push(*code);
                }
            }
        }

        // Baseline goes last even if it already appeared earlier
        chain.retain(|c| *c != self.default);
        chain.push(self.default.clone());
        chain
    }
}

/// Extract the lowercased primary language subtag, if the input looks like a
/// locale tag at all.
pub fn primary_subtag(locale: &str) -> Option<String> {
    PRIMARY_SUBTAG
        .captures(locale)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}
