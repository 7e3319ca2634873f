// Censoring: mask matched spans without changing the character count.

use std::ops::Range;

use crate::detect::traits::MatchSpan;

/// Mask character used when the configuration doesn't name a usable one.
pub const DEFAULT_MASK: char = '*';

/// A mask must never be able to spell a lexicon term, so letters and digits
/// are out.
pub fn is_valid_mask(mask: char) -> bool {
    !mask.is_alphanumeric() && !mask.is_whitespace() && !mask.is_control()
}

/// Sort ranges and merge the ones that overlap.
pub fn merge_spans<I>(spans: I) -> Vec<Range<usize>>
where
    I: IntoIterator<Item = Range<usize>>,
{
    let mut spans: Vec<Range<usize>> = spans.into_iter().filter(|r| r.start < r.end).collect();
    spans.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Replace every matched region of `text` with `mask`, one mask per character.
///
/// Spans that don't land on character boundaries are left untouched rather
/// than risk splitting a character.
pub fn censor(text: &str, matches: &[MatchSpan], mask: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in merge_spans(matches.iter().map(MatchSpan::range)) {
        let Some(masked) = text.get(span.clone()) else {
            continue;
        };
        out.push_str(&text[cursor..span.start]);
        out.extend(std::iter::repeat(mask).take(masked.chars().count()));
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::pack::Tier;

    fn span(start: usize, end: usize) -> MatchSpan {
        MatchSpan {
            start,
            end,
            term: String::new(),
            tier: Tier::Mild,
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_merge_overlapping() {
        assert_eq!(merge_spans(vec![5..9, 0..3, 2..4]), vec![0..4, 5..9]);
    }

    #[test]
    fn test_censor_preserves_char_count() {
        let text = "ой глупост";
        let start = text.find("глупост").unwrap();
        let out = censor(text, &[span(start, text.len())], '*');
        assert_eq!(out, "ой *******");
        assert_eq!(out.chars().count(), text.chars().count());
    }

    #[test]
    fn test_overlapping_spans_masked_once() {
        let out = censor("abcdefgh", &[span(1, 4), span(3, 6)], '#');
        assert_eq!(out, "a#####gh");
    }

    #[test]
    fn test_non_boundary_span_skipped() {
        // Byte 1 is inside the two-byte "é"
        let out = censor("é!", &[span(1, 3)], '*');
        assert_eq!(out, "é!");
    }

    #[test]
    fn test_mask_validation() {
        assert!(is_valid_mask('*'));
        assert!(is_valid_mask('█'));
        assert!(!is_valid_mask('x'));
        assert!(!is_valid_mask('7'));
        assert!(!is_valid_mask(' '));
    }
}
