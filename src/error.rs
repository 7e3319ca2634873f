// Fault taxonomy for the moderation engine.
//
// None of these ever escape check/validate/batch_check. They exist so the
// places that recover from them can log something precise: a degraded pack,
// a skipped lexicon entry, or a normalization pass that had to be abandoned.

use std::path::PathBuf;

use thiserror::Error;

/// A language-pack or whitelist resource could not be loaded.
/// The affected pack degrades to empty; startup continues.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon resource {origin} is malformed: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("lexicon resource {origin} declares an empty language code")]
    MissingCode { origin: String },

    #[error("failed to compile matcher for language pack {code}: {reason}")]
    Build { code: String, reason: String },
}

/// A single lexicon entry was unusable and has been skipped.
#[derive(Debug, Error)]
pub enum MatchFault {
    #[error("entry {term:?} normalizes to nothing")]
    Empty { term: String },

    #[error("entry {term:?} is shorter than {min} characters and not marked always_match")]
    TooShort { term: String, min: usize },

    #[error("entry {term:?} contains no letters or digits")]
    NoWordCharacters { term: String },
}

/// The normalizer produced a correction table that does not line up with its
/// output. Matching falls back to the lowercased raw text.
#[derive(Debug, Error)]
pub enum NormalizationFault {
    #[error("correction table has {table} entries for {chars} normalized characters")]
    LengthMismatch { table: usize, chars: usize },

    #[error("correction entry {index} points outside the original text ({start}..{end} of {len})")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}
