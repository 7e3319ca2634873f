use std::io::{self, BufRead, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use cinder::config::Config;
use cinder::moderation::policy::ValidationPolicy;
use cinder::output::terminal;
use cinder::scoring::severity::Severity;

/// Cinder: multi-locale content moderation.
///
/// Checks user-submitted text for offensive content across languages and
/// scripts, including text disguised with digits, symbols or look-alike
/// letters.
#[derive(Parser)]
#[command(name = "cinder", version, about)]
struct Cli {
    /// Print machine-readable JSON instead of colored text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect, classify and censor offensive content in a text
    Check {
        /// Text to check (reads stdin when omitted)
        text: Option<String>,

        /// Locale of the text (e.g. en, en-US, bg_BG)
        #[arg(long, short)]
        locale: Option<String>,
    },

    /// Decide whether a text would be accepted
    Validate {
        /// Text to validate (reads stdin when omitted)
        text: Option<String>,

        /// Locale of the text
        #[arg(long, short)]
        locale: Option<String>,

        /// Let mild text through regardless of the threshold
        #[arg(long)]
        allow_mild: bool,

        /// Lowest severity to block: mild, moderate or severe
        #[arg(long)]
        block_threshold: Option<Severity>,
    },

    /// Check a file of texts, one per line (stdin when no file is given)
    Batch {
        /// File with one text per line
        file: Option<PathBuf>,

        /// Locale applied to every line
        #[arg(long, short)]
        locale: Option<String>,
    },

    /// Show the loaded language packs and whitelist size
    Lexicon,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cinder=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    if let Some(dir) = &config.lexicon_dir {
        info!(dir = %dir.display(), "Using lexicon override directory");
    }
    let engine = cinder::init(&config);

    match cli.command {
        Commands::Check { text, locale } => {
            let text = text_or_stdin(text)?;
            let locale = locale.unwrap_or_else(|| config.default_locale.clone());
            let result = engine.check(&text, &locale);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_check(&text, &result);
            }
        }

        Commands::Validate {
            text,
            locale,
            allow_mild,
            block_threshold,
        } => {
            let text = text_or_stdin(text)?;
            let locale = locale.unwrap_or_else(|| config.default_locale.clone());
            let outcome = if !allow_mild && block_threshold.is_none() {
                engine.validate_default(&text, &locale)
            } else {
                let defaults = engine.default_policy();
                let policy = ValidationPolicy {
                    allow_mild: allow_mild || defaults.allow_mild,
                    block_threshold: block_threshold.unwrap_or(defaults.block_threshold),
                };
                engine.validate(&text, &locale, &policy)
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                terminal::display_validation(&outcome);
            }

            if !outcome.valid {
                std::process::exit(1);
            }
        }

        Commands::Batch { file, locale } => {
            let texts = read_lines(file.as_deref())?;
            let locale = locale.unwrap_or_else(|| config.default_locale.clone());
            if texts.is_empty() {
                println!("{}", "No texts to check.".dimmed());
                return Ok(());
            }

            info!(texts = texts.len(), locale = %locale, "Running batch check");
            let results = engine.batch_check(&texts, &locale);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                terminal::display_batch(&texts, &results);
            }
        }

        Commands::Lexicon => {
            let store = engine.store();
            if cli.json {
                let packs: Vec<serde_json::Value> = store
                    .packs()
                    .map(|p| {
                        serde_json::json!({
                            "code": p.code(),
                            "script": p.script(),
                            "terms": p.len(),
                        })
                    })
                    .collect();
                let summary = serde_json::json!({
                    "default_locale": engine.resolver().default_code(),
                    "packs": packs,
                    "whitelist": store.whitelist().len(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                terminal::display_lexicon_summary(store, engine.resolver().default_code());
            }
        }
    }

    Ok(())
}

/// Use the argument if given, otherwise read all of stdin.
fn text_or_stdin(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

/// One text per non-empty line, from a file or stdin.
fn read_lines(file: Option<&std::path::Path>) -> Result<Vec<String>> {
    let lines: Vec<String> = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .lines()
            .map(str::to_string)
            .collect(),
        None => io::stdin()
            .lock()
            .lines()
            .collect::<Result<_, _>>()
            .context("Failed to read texts from stdin")?,
    };
    Ok(lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect())
}
