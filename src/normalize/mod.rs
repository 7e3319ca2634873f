// Text normalization: undo the tricks people use to slip words past a filter.
//
// The pipeline runs over "units": one normalized character plus the byte
// range of the original text it came from. Every stage rewrites the unit list
// and carries the ranges along, so when a match is found in the normalized
// string we can always map it back onto what the user actually typed.
//
// Stages, in order:
//   1. lowercase
//   2. collapse runs of 3+ identical letters ("shiiiit" -> "shit")
//   3. fold obfuscated forms to canonical letters ("$h1t" -> "shit")
//   4. drop separators wedged between letters ("s.h.i.t" -> "shit")

pub mod obfuscation;

use std::ops::Range;

use tracing::warn;

use crate::error::NormalizationFault;
use obfuscation::{ObfuscationMap, Script};

/// A run of this many identical letters collapses to a single letter.
pub const MIN_REPEAT_RUN: usize = 3;

/// Characters stripped when they sit between two letters of the same script.
/// Whitespace is deliberately absent, and so is the mask character `*`.
pub const SEPARATORS: &[char] = &[
    '.', '-', '_', '~', '|', ',', ':', ';', '\'', '"', '/', '\\', '^', '=', '#', '·', '•', '’',
];

/// Symbol surface forms that double as sentence punctuation. These only fold
/// when a letter follows them, so "ass!" keeps its word boundary.
const PUNCTUATION_SURFACES: &[char] = &['!'];

/// Normalized text plus the correction table back to the original.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    /// Original byte range for each char of `text`, in order
    sources: Vec<Range<usize>>,
    /// Byte offset in `text` where each char starts
    starts: Vec<usize>,
    original_len: usize,
    /// Censor mask, counted as part of a word by the boundary checks
    mask: Option<char>,
}

#[derive(Debug, Clone)]
struct Unit {
    ch: char,
    src: Range<usize>,
}

impl NormalizedText {
    /// Lowercase-only view of `text`. This is what matching falls back to
    /// when the full pipeline faults.
    pub fn raw(text: &str) -> Self {
        Self::build(lowercase(text), text.len())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte length of the text this was normalized from.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Map a byte range of the normalized text back to the original text.
    ///
    /// When normalization merged several original ranges into the covered
    /// characters, the result is the union of all of them. Returns `None`
    /// for empty or out-of-range input.
    pub fn to_original(&self, start: usize, end: usize) -> Option<Range<usize>> {
        if start >= end || end > self.text.len() {
            return None;
        }
        let first = match self.starts.binary_search(&start) {
            Ok(i) => i,
            Err(i) => i.checked_sub(1)?,
        };
        let last = match self.starts.binary_search(&(end - 1)) {
            Ok(i) => i,
            Err(i) => i.checked_sub(1)?,
        };
        let covered = &self.sources[first..=last];
        let lo = covered.iter().map(|r| r.start).min()?;
        let hi = covered.iter().map(|r| r.end).max()?;
        Some(lo..hi)
    }

    /// Treat `mask` as a word character. A fragment left glued to an
    /// already-censored word ("****ass") then never reads as a whole word.
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    /// True when the normalized character before `byte` is not a letter,
    /// digit or the mask.
    pub fn is_boundary_before(&self, byte: usize) -> bool {
        self.text[..byte]
            .chars()
            .next_back()
            .map_or(true, |c| !self.is_word_char(c))
    }

    /// True when the normalized character at `byte` is not a letter, digit
    /// or the mask.
    pub fn is_boundary_after(&self, byte: usize) -> bool {
        self.text[byte..]
            .chars()
            .next()
            .map_or(true, |c| !self.is_word_char(c))
    }

    fn is_word_char(&self, c: char) -> bool {
        c.is_alphanumeric() || self.mask == Some(c)
    }

    fn build(units: Vec<Unit>, original_len: usize) -> Self {
        let mut text = String::with_capacity(units.len());
        let mut sources = Vec::with_capacity(units.len());
        let mut starts = Vec::with_capacity(units.len());
        for unit in units {
            starts.push(text.len());
            text.push(unit.ch);
            sources.push(unit.src);
        }
        Self {
            text,
            sources,
            starts,
            original_len,
            mask: None,
        }
    }

    fn verify(self) -> Result<Self, NormalizationFault> {
        let chars = self.text.chars().count();
        if chars != self.sources.len() || chars != self.starts.len() {
            return Err(NormalizationFault::LengthMismatch {
                table: self.sources.len(),
                chars,
            });
        }
        for (index, src) in self.sources.iter().enumerate() {
            if src.start >= src.end || src.end > self.original_len {
                return Err(NormalizationFault::OutOfBounds {
                    index,
                    start: src.start,
                    end: src.end,
                    len: self.original_len,
                });
            }
        }
        Ok(self)
    }
}

/// Run the full normalization pipeline.
///
/// `hint` is the script used for tokens with no clear majority script
/// (typically the script of the requested locale).
pub fn normalize(text: &str, hint: Script) -> Result<NormalizedText, NormalizationFault> {
    let units = lowercase(text);
    let units = collapse_repeats(units);
    let units = deobfuscate(units, ObfuscationMap::global(), hint);
    let units = strip_separators(units);
    NormalizedText::build(units, text.len()).verify()
}

/// Normalize, or fall back to the lowercased raw text if the pipeline faults.
pub fn normalize_or_raw(text: &str, hint: Script) -> NormalizedText {
    match normalize(text, hint) {
        Ok(normalized) => normalized,
        Err(fault) => {
            warn!(error = %fault, "Normalization fault, matching against raw text");
            NormalizedText::raw(text)
        }
    }
}

fn lowercase(text: &str) -> Vec<Unit> {
    let mut units = Vec::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        let src = offset..offset + ch.len_utf8();
        // Some characters lowercase to more than one char; each keeps the source
        for lower in ch.to_lowercase() {
            units.push(Unit {
                ch: lower,
                src: src.clone(),
            });
        }
    }
    units
}

fn collapse_repeats(units: Vec<Unit>) -> Vec<Unit> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let ch = units[i].ch;
        let run = units[i..].iter().take_while(|u| u.ch == ch).count();
        if run >= MIN_REPEAT_RUN && ch.is_alphabetic() {
            out.push(Unit {
                ch,
                src: units[i].src.start..units[i + run - 1].src.end,
            });
        } else {
            out.extend_from_slice(&units[i..i + run]);
        }
        i += run;
    }
    out
}

fn deobfuscate(units: Vec<Unit>, map: &ObfuscationMap, hint: Script) -> Vec<Unit> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if units[i].ch.is_whitespace() {
            out.push(units[i].clone());
            i += 1;
            continue;
        }
        let end = units[i..]
            .iter()
            .position(|u| u.ch.is_whitespace())
            .map_or(units.len(), |p| i + p);
        fold_token(&units[i..end], map, hint, &mut out);
        i = end;
    }
    out
}

/// Fold one whitespace-delimited token toward its dominant script.
fn fold_token(token: &[Unit], map: &ObfuscationMap, hint: Script, out: &mut Vec<Unit>) {
    let script = dominant_script(token, hint);
    let chars: Vec<char> = token.iter().map(|u| u.ch).collect();
    let token_start = out.len();

    let mut i = 0;
    while i < token.len() {
        if let Some((len, canonical)) = map.longest_match(script, &chars[i..]) {
            let surface = &chars[i..i + len];
            let is_letter_form = surface.iter().all(|c| c.is_alphabetic());
            // Look past separators: "$.h.1.t" still has letters on both sides
            let next_is_letter = chars[i + len..]
                .iter()
                .find(|c| !SEPARATORS.contains(*c))
                .is_some_and(|c| c.is_alphabetic());
            let prev_is_letter = out[token_start..]
                .iter()
                .rev()
                .find(|u| !SEPARATORS.contains(&u.ch))
                .is_some_and(|u| u.ch.is_alphabetic());
            let is_punctuation = PUNCTUATION_SURFACES.contains(&surface[0]);

            if is_letter_form || next_is_letter || (prev_is_letter && !is_punctuation) {
                out.push(Unit {
                    ch: canonical,
                    src: token[i].src.start..token[i + len - 1].src.end,
                });
                i += len;
                continue;
            }
        }
        out.push(token[i].clone());
        i += 1;
    }
}

fn dominant_script(token: &[Unit], hint: Script) -> Script {
    let (mut latin, mut cyrillic) = (0usize, 0usize);
    for unit in token {
        match Script::of(unit.ch) {
            Some(Script::Latin) => latin += 1,
            Some(Script::Cyrillic) => cyrillic += 1,
            None => {}
        }
    }
    match latin.cmp(&cyrillic) {
        std::cmp::Ordering::Greater => Script::Latin,
        std::cmp::Ordering::Less => Script::Cyrillic,
        std::cmp::Ordering::Equal => hint,
    }
}

fn strip_separators(units: Vec<Unit>) -> Vec<Unit> {
    let mut out: Vec<Unit> = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if !SEPARATORS.contains(&units[i].ch) {
            out.push(units[i].clone());
            i += 1;
            continue;
        }
        let run_end = units[i..]
            .iter()
            .position(|u| !SEPARATORS.contains(&u.ch))
            .map_or(units.len(), |p| i + p);
        let before = out.last().and_then(|u| Script::of(u.ch));
        let after = units.get(run_end).and_then(|u| Script::of(u.ch));
        if before.is_none() || before != after {
            out.extend_from_slice(&units[i..run_end]);
        }
        i = run_end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> String {
        normalize(text, Script::Latin).unwrap().as_str().to_string()
    }

    #[test]
    fn test_collapse_only_letters() {
        assert_eq!(norm("shiiiit"), "shit");
        assert_eq!(norm("cool"), "cool");
        assert_eq!(norm("5000"), "5000");
    }

    #[test]
    fn test_collapsed_run_maps_to_whole_original_range() {
        let n = normalize("shiiiit", Script::Latin).unwrap();
        // "i" in the normalized text covers all four original i's
        assert_eq!(n.to_original(2, 3), Some(2..6));
        assert_eq!(n.to_original(0, 4), Some(0..7));
    }

    #[test]
    fn test_leading_symbol_folds_before_letter() {
        assert_eq!(norm("$hit"), "shit");
        assert_eq!(norm("a$$"), "ass");
    }

    #[test]
    fn test_trailing_exclamation_is_punctuation() {
        assert_eq!(norm("ass!"), "ass!");
        assert_eq!(norm("sh!t"), "shit");
    }

    #[test]
    fn test_separators_between_letters_removed() {
        let n = normalize("s.h-i_t", Script::Latin).unwrap();
        assert_eq!(n.as_str(), "shit");
        assert_eq!(n.to_original(0, 4), Some(0..7));
    }

    #[test]
    fn test_separator_between_scripts_kept() {
        assert_eq!(norm("a-ж"), "a-ж");
    }

    #[test]
    fn test_out_of_range_remap() {
        let n = normalize("abc", Script::Latin).unwrap();
        assert_eq!(n.to_original(2, 2), None);
        assert_eq!(n.to_original(0, 10), None);
    }

    #[test]
    fn test_mask_is_not_a_boundary() {
        let plain = normalize("****ass", Script::Latin).unwrap();
        assert!(plain.is_boundary_before(4));
        let masked = plain.with_mask('*');
        assert!(!masked.is_boundary_before(4));
        // Only the configured mask joins words
        assert!(masked.with_mask('#').is_boundary_before(4));
    }

    #[test]
    fn test_boundaries() {
        let n = normalize("an ass here", Script::Latin).unwrap();
        assert!(n.is_boundary_before(3));
        assert!(n.is_boundary_after(6));
        assert!(!n.is_boundary_before(4));
    }
}
