// Obfuscation map: canonical letters and the surface forms people type instead.
//
// Two tables, one per script. A Latin-dominant token is folded through the
// Latin table (Cyrillic lookalikes, leetspeak digits and symbols become Latin
// letters) and a Cyrillic-dominant token through the Cyrillic table. Keeping
// them apart is what lets "глупост" survive normalization untouched while
// "shіt" (with a Ukrainian і) still folds to "shit".

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Writing system of a token or language pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    #[default]
    Latin,
    Cyrillic,
}

impl Script {
    /// Classify a single character, or `None` for anything that isn't a letter
    /// of a supported script.
    pub fn of(ch: char) -> Option<Script> {
        if !ch.is_alphabetic() {
            return None;
        }
        match ch {
            'a'..='z' | 'A'..='Z' => Some(Script::Latin),
            '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}' => Some(Script::Latin),
            '\u{0400}'..='\u{052F}' => Some(Script::Cyrillic),
            _ => None,
        }
    }
}

const LATIN_FORMS: &[(char, &[&str])] = &[
    ('a', &["4", "@", "а", "α"]),
    ('b', &["8"]),
    ('c', &["с", "¢"]),
    ('e', &["3", "е", "€", "ё"]),
    ('g', &["9"]),
    ('h', &["н", "|-|"]),
    ('i', &["1", "!", "і", "ι"]),
    ('k', &["к", "|<"]),
    ('m', &["м"]),
    ('o', &["0", "о", "ο", "()"]),
    ('p', &["р"]),
    ('s', &["5", "$", "ѕ"]),
    ('t', &["7", "т"]),
    ('u', &["υ"]),
    ('x', &["х"]),
    ('y', &["у"]),
];

const CYRILLIC_FORMS: &[(char, &[&str])] = &[
    ('а', &["a", "4", "@"]),
    ('б', &["6"]),
    ('е', &["e", "ё", "€"]),
    ('з', &["3"]),
    ('к', &["k"]),
    ('м', &["m"]),
    ('н', &["h"]),
    ('о', &["o", "0", "()"]),
    ('р', &["p"]),
    ('с', &["c"]),
    ('т', &["t", "7"]),
    ('у', &["y"]),
    ('х', &["x"]),
];

static GLOBAL: LazyLock<ObfuscationMap> =
    LazyLock::new(|| ObfuscationMap::from_tables(LATIN_FORMS, CYRILLIC_FORMS));

/// Process-wide reverse lookup from obfuscated surface forms to canonical letters.
#[derive(Debug)]
pub struct ObfuscationMap {
    latin: HashMap<String, char>,
    cyrillic: HashMap<String, char>,
    /// Longest surface form in either table, in chars
    max_surface_len: usize,
}

impl ObfuscationMap {
    /// The shared map. Built on first use.
    pub fn global() -> &'static ObfuscationMap {
        &GLOBAL
    }

    /// Build a map from forward tables (canonical → surface forms).
    pub fn from_tables(latin: &[(char, &[&str])], cyrillic: &[(char, &[&str])]) -> Self {
        let (latin, latin_max) = reverse(latin);
        let (cyrillic, cyrillic_max) = reverse(cyrillic);
        Self {
            latin,
            cyrillic,
            max_surface_len: latin_max.max(cyrillic_max),
        }
    }

    /// Find the longest surface form at the start of `window` for the given
    /// script. Returns (surface length in chars, canonical letter).
    pub fn longest_match(&self, script: Script, window: &[char]) -> Option<(usize, char)> {
        let table = match script {
            Script::Latin => &self.latin,
            Script::Cyrillic => &self.cyrillic,
        };
        let longest = self.max_surface_len.min(window.len());
        let mut key = String::with_capacity(longest * 4);
        let mut best = None;
        for (len, ch) in window.iter().take(longest).enumerate() {
            key.push(*ch);
            if let Some(&canonical) = table.get(&key) {
                best = Some((len + 1, canonical));
            }
        }
        best
    }

    /// Whether `ch` appears as the first character of any surface form.
    /// Used by tests to prove the mask character is never folded.
    pub fn is_surface_start(&self, ch: char) -> bool {
        self.latin
            .keys()
            .chain(self.cyrillic.keys())
            .any(|k| k.starts_with(ch))
    }
}

fn reverse(forms: &[(char, &[&str])]) -> (HashMap<String, char>, usize) {
    let mut map = HashMap::new();
    let mut max_len = 0;
    for (canonical, surfaces) in forms {
        for surface in surfaces.iter() {
            max_len = max_len.max(surface.chars().count());
            // First canonical wins if two letters claim the same surface form
            map.entry(surface.to_string()).or_insert(*canonical);
        }
    }
    (map, max_len)
}
