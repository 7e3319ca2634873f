// Detection: trait-based matchers run against normalized text.
//
// LexiconDetector walks a language pack with an Aho-Corasick automaton.
// PatternDetector adds regex heuristics for inflected forms in languages that
// need them. Both sit behind the Detector trait.

pub mod lexicon;
pub mod pattern;
pub mod traits;
