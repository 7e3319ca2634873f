// Scoring: turn filtered matches into a severity level.

pub mod severity;
