// Post-detection filtering: whitelist suppression and containment folding.

use std::ops::Range;

use crate::detect::traits::MatchSpan;

/// Drop every match that lies entirely inside a whitelisted occurrence.
///
/// Containment is positional: a match merely touching or overlapping a
/// whitelisted word is kept. Protected ranges are sorted once and each match
/// is tested with a binary search.
pub fn remove_whitelisted(matches: Vec<MatchSpan>, protected: &[Range<usize>]) -> Vec<MatchSpan> {
    if protected.is_empty() {
        return matches;
    }

    let mut sorted: Vec<Range<usize>> = protected.to_vec();
    sorted.sort_by_key(|w| w.start);
    // reach[i]: furthest end among the first i + 1 ranges
    let reach: Vec<usize> = sorted
        .iter()
        .scan(0, |furthest, w| {
            *furthest = (*furthest).max(w.end);
            Some(*furthest)
        })
        .collect();

    matches
        .into_iter()
        .filter(|m| {
            let opened = sorted.partition_point(|w| w.start <= m.start);
            opened == 0 || reach[opened - 1] < m.end
        })
        .collect()
}

/// Fold matches that lie inside another match into the containing one.
///
/// Two detectors (or two packs) often report the same word, or one reports a
/// stem inside the other's inflected form. Each word should count once, at
/// the highest tier anyone gave it. Output is sorted by start offset.
pub fn fold_contained(mut matches: Vec<MatchSpan>) -> Vec<MatchSpan> {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(b.tier.cmp(&a.tier))
    });

    // Every kept span starts at or before the current match, so the match is
    // contained in some kept span iff the one reaching furthest covers it.
    let mut kept: Vec<MatchSpan> = Vec::with_capacity(matches.len());
    let mut widest: Option<usize> = None;
    for m in matches {
        if let Some(i) = widest {
            if kept[i].end >= m.end {
                kept[i].tier = kept[i].tier.max(m.tier);
                continue;
            }
        }
        widest = Some(kept.len());
        kept.push(m);
    }
    kept
}
