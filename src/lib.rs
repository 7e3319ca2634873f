// Cinder: multi-locale content moderation
//
// This is the library root. Each module corresponds to one stage of the
// moderation pipeline; `moderation` ties them together behind check,
// validate and batch_check.

pub mod config;
pub mod detect;
pub mod error;
pub mod lexicon;
pub mod locale;
pub mod moderation;
pub mod normalize;
pub mod output;
pub mod scoring;

pub use config::Config;
pub use detect::traits::{Detector, MatchSpan};
pub use lexicon::pack::Tier;
pub use moderation::policy::{ValidationOutcome, ValidationPolicy};
pub use moderation::{batch_check, check, engine, init, validate, CheckResult, Moderator};
pub use scoring::severity::Severity;
