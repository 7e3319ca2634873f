// Colored terminal output for check results and lexicon summaries.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here; --json output bypasses it entirely.

use colored::Colorize;

use crate::lexicon::pack::Tier;
use crate::lexicon::store::LexiconStore;
use crate::moderation::policy::ValidationOutcome;
use crate::moderation::CheckResult;
use crate::scoring::severity::Severity;

/// Display a single check result, matches first.
pub fn display_check(text: &str, result: &CheckResult) {
    println!(
        "\n{}",
        format!("=== Check ({}) ===", result.locale_used).bold()
    );
    println!("  Severity: {}", colorize_severity(result.severity));

    if result.matches.is_empty() {
        println!("  {}", "No offensive content found.".green());
        return;
    }

    println!("  Matches:");
    for m in &result.matches {
        let surface = text.get(m.range()).unwrap_or("?");
        println!(
            "    {:>4}..{:<4} {:<16} {:<9} {} {}",
            m.start,
            m.end,
            format!("\"{surface}\""),
            colorize_tier(m.tier),
            m.language.dimmed(),
            format!("({})", m.term).dimmed(),
        );
    }
    println!("  Censored: {}", result.censored_text);
}

/// Display a validation decision.
pub fn display_validation(outcome: &ValidationOutcome) {
    let verdict = if outcome.valid {
        "VALID".green().bold()
    } else {
        "BLOCKED".red().bold()
    };
    println!("  {}  severity: {}", verdict, colorize_severity(outcome.severity));
    if let Some(key) = outcome.message_key {
        println!("  Message key: {}", key.dimmed());
    }
}

/// Display one line per batch entry plus a severity tally.
pub fn display_batch(texts: &[String], results: &[CheckResult]) {
    println!(
        "\n{}",
        format!("=== Batch ({} texts) ===", results.len()).bold()
    );
    println!();

    for (i, (text, result)) in texts.iter().zip(results).enumerate() {
        let preview = super::truncate_chars(&result.censored_text, 70);
        let shown = if result.has_profanity {
            preview
        } else {
            super::truncate_chars(text, 70)
        };
        println!(
            "  {:>4}. {:<10} {}",
            i + 1,
            colorize_severity(result.severity),
            shown.dimmed()
        );
    }

    println!();

    let count = |level: Severity| results.iter().filter(|r| r.severity == level).count();
    let severe = count(Severity::Severe);
    let moderate = count(Severity::Moderate);
    let mild = count(Severity::Mild);

    if severe > 0 {
        println!("  {} {} severe", "!!".red().bold(), severe);
    }
    if moderate > 0 {
        println!("  {} {} moderate", "!".bright_red(), moderate);
    }
    if mild > 0 {
        println!("  {} {} mild", "~".yellow(), mild);
    }
    if severe + moderate + mild == 0 {
        println!("  {}", "All texts clean.".green());
    }
}

/// Display loaded language packs and their tier sizes.
pub fn display_lexicon_summary(store: &LexiconStore, default_locale: &str) {
    println!("\n{}", "=== Lexicons ===".bold());
    println!();
    println!(
        "  {:<6} {:<9} {:>7} {:>9} {:>6}",
        "Code".dimmed(),
        "Script".dimmed(),
        "Severe".dimmed(),
        "Moderate".dimmed(),
        "Mild".dimmed(),
    );
    println!("  {}", "-".repeat(42).dimmed());

    for pack in store.packs() {
        let marker = if pack.code() == default_locale {
            " (default)".cyan().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<6} {:<9} {:>7} {:>9} {:>6}{}",
            pack.code(),
            format!("{:?}", pack.script()).to_lowercase(),
            pack.tier_terms(Tier::Severe).count(),
            pack.tier_terms(Tier::Moderate).count(),
            pack.tier_terms(Tier::Mild).count(),
            marker,
        );
    }

    println!();
    println!("  Whitelist: {} terms", store.whitelist().len());
}

/// Colorize a severity level.
pub fn colorize_severity(severity: Severity) -> colored::ColoredString {
    let label = severity.as_str();
    match severity {
        Severity::Severe => label.red().bold(),
        Severity::Moderate => label.bright_red(),
        Severity::Mild => label.yellow(),
        Severity::None => label.green(),
    }
}

fn colorize_tier(tier: Tier) -> colored::ColoredString {
    let label = tier.as_str();
    match tier {
        Tier::Severe => label.red(),
        Tier::Moderate => label.bright_red(),
        Tier::Mild => label.yellow(),
    }
}
