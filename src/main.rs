//! Habit DNA CLI
//!
//! Builds behavioral fingerprints from habit activity logs.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use habit_dna::{
    batch::{run_batch, BatchJob},
    config::Config,
    entry::{read_log, HabitEntry, StreakSummary},
    store::{FingerprintStore, JsonFileStore, StoreError},
    AuditLog, DnaEngine, VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "habit-dna")]
#[command(version = VERSION)]
#[command(about = "Deterministic behavioral fingerprints from habit logs", long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the component vector for every entry in a log
    Analyze {
        /// Activity log (JSON array or JSON Lines)
        log: PathBuf,

        #[command(flatten)]
        streaks: StreakArgs,
    },

    /// Print the full fingerprint for every entry in a log without storing it
    Fingerprint {
        /// Activity log (JSON array or JSON Lines)
        log: PathBuf,

        #[command(flatten)]
        streaks: StreakArgs,
    },

    /// Regenerate and store a user's fingerprint
    Regenerate {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Activity log (JSON array or JSON Lines)
        log: PathBuf,

        #[command(flatten)]
        streaks: StreakArgs,
    },

    /// Score compatibility between two stored users
    Compare {
        user_a: String,
        user_b: String,
    },

    /// Show a user's stored fingerprint and mutation history
    History {
        #[arg(long)]
        user: String,
    },

    /// Regenerate every `<user>.json` / `<user>.jsonl` log in a directory
    Batch {
        dir: PathBuf,

        /// Worker threads (defaults to the configured value)
        #[arg(long)]
        workers: Option<usize>,

        /// Derive streaks from each log
        #[arg(long)]
        derive_streaks: bool,
    },

    /// Show cumulative engine statistics
    Stats,

    /// Show configuration
    Config,
}

/// Streak summary options shared by the log commands.
#[derive(Args)]
struct StreakArgs {
    /// Active streak count from an external tracker
    #[arg(long, requires = "total_streaks", conflicts_with = "derive_streaks")]
    active_streaks: Option<u32>,

    /// Total streak count from an external tracker
    #[arg(long, requires = "active_streaks", conflicts_with = "derive_streaks")]
    total_streaks: Option<u32>,

    /// Derive streaks from the log in the configured timezone
    #[arg(long)]
    derive_streaks: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };
    config.validate().context("invalid configuration")?;

    init_logging(&config);

    let audit = Arc::new(AuditLog::with_persistence(config.audit_path()));
    let engine = DnaEngine::with_audit(&config, audit.clone())?;

    let result = match cli.command {
        Commands::Analyze { log, streaks } => cmd_analyze(&engine, &log, &streaks),
        Commands::Fingerprint { log, streaks } => cmd_fingerprint(&engine, &log, &streaks),
        Commands::Regenerate { user, log, streaks } => {
            cmd_regenerate(&engine, &config, &user, &log, &streaks)
        }
        Commands::Compare { user_a, user_b } => cmd_compare(&engine, &config, &user_a, &user_b),
        Commands::History { user } => cmd_history(&config, &user),
        Commands::Batch {
            dir,
            workers,
            derive_streaks,
        } => cmd_batch(
            &engine,
            &config,
            &dir,
            workers.unwrap_or(config.workers),
            derive_streaks,
        ),
        Commands::Stats => {
            println!("{}", audit.summary());
            Ok(())
        }
        Commands::Config => cmd_config(&config),
    };

    if let Err(e) = audit.save() {
        tracing::warn!("could not save audit counters: {e}");
    }

    result
}

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read and validate a log file.
fn load_entries(engine: &DnaEngine, path: &Path) -> Result<Vec<HabitEntry>> {
    let raws = read_log(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(engine.prepare(raws))
}

fn resolve_streaks(
    engine: &DnaEngine,
    args: &StreakArgs,
    entries: &[HabitEntry],
) -> Option<StreakSummary> {
    if args.derive_streaks {
        return Some(engine.derive_streaks(entries, Utc::now()));
    }
    match (args.active_streaks, args.total_streaks) {
        (Some(active), Some(total)) => Some(StreakSummary::new(active, total)),
        _ => None,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(config: &Config) -> Result<JsonFileStore> {
    let path = config.store_path();
    JsonFileStore::open(&path).with_context(|| format!("opening store at {}", path.display()))
}

fn cmd_analyze(engine: &DnaEngine, log: &Path, streak_args: &StreakArgs) -> Result<()> {
    let entries = load_entries(engine, log)?;
    let streaks = resolve_streaks(engine, streak_args, &entries);
    let fingerprint = engine.fingerprint_log(&entries, streaks.as_ref());

    tracing::debug!(entries = entries.len(), "analyzed log");
    print_json(&fingerprint.component_vector)
}

fn cmd_fingerprint(engine: &DnaEngine, log: &Path, streak_args: &StreakArgs) -> Result<()> {
    let entries = load_entries(engine, log)?;
    let streaks = resolve_streaks(engine, streak_args, &entries);
    let fingerprint = engine.fingerprint_log(&entries, streaks.as_ref());

    print_json(&fingerprint)
}

fn cmd_regenerate(
    engine: &DnaEngine,
    config: &Config,
    user: &str,
    log: &Path,
    streak_args: &StreakArgs,
) -> Result<()> {
    let store = open_store(config)?;
    let entries = load_entries(engine, log)?;
    let streaks = resolve_streaks(engine, streak_args, &entries);

    let committed = engine
        .regenerate_and_store(&store, user, &entries, streaks.as_ref())
        .with_context(|| format!("regenerating fingerprint for '{user}'"))?;

    println!("User:      {user}");
    println!("Revision:  {}", committed.record.revision);
    println!("Sequence:  {}", committed.record.fingerprint.sequence);
    println!(
        "Colors:    {} {} {}",
        committed.record.fingerprint.colors.primary,
        committed.record.fingerprint.colors.secondary,
        committed.record.fingerprint.colors.accent
    );
    println!("Vector:    {}", committed.record.fingerprint.component_vector);
    match committed.mutation {
        Some(event) => println!("Mutation:  {}", event.description),
        None => println!("Mutation:  none"),
    }
    Ok(())
}

fn cmd_compare(engine: &DnaEngine, config: &Config, user_a: &str, user_b: &str) -> Result<()> {
    let store = open_store(config)?;
    let result = engine.compare_users(&store, user_a, user_b)?;
    print_json(&result)
}

fn cmd_history(config: &Config, user: &str) -> Result<()> {
    let store = open_store(config)?;
    let Some(record) = store.load(user)? else {
        bail!("no fingerprint stored for '{user}'");
    };

    println!("User:      {}", record.user_id);
    println!("Revision:  {}", record.revision);
    println!("Sequence:  {}", record.fingerprint.sequence);
    println!("Updated:   {}", record.updated_at.to_rfc3339());
    println!();

    if record.mutations.is_empty() {
        println!("No mutations recorded.");
        return Ok(());
    }

    println!("Mutations ({}):", record.mutations.len());
    for event in &record.mutations {
        println!(
            "  [{}] from {}: {}",
            event.timestamp.format("%Y-%m-%d %H:%M"),
            event.previous_sequence,
            event.description
        );
    }
    Ok(())
}

fn cmd_batch(
    engine: &DnaEngine,
    config: &Config,
    dir: &Path,
    workers: usize,
    derive_streaks: bool,
) -> Result<()> {
    let store = open_store(config)?;
    let now = Utc::now();

    let mut jobs = Vec::new();
    for path in log_files(dir)? {
        let Some(user_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let entries = load_entries(engine, &path)?;
        let streaks = derive_streaks.then(|| engine.derive_streaks(&entries, now));
        let previous = store.load(user_id)?;

        jobs.push(BatchJob {
            user_id: user_id.to_string(),
            entries,
            streaks,
            previous,
        });
    }

    if jobs.is_empty() {
        println!("No logs found in {}", dir.display());
        return Ok(());
    }

    let previous: std::collections::HashMap<String, _> = jobs
        .iter()
        .filter_map(|j| j.previous.clone().map(|r| (j.user_id.clone(), r)))
        .collect();

    let mut stored = 0;
    let mut conflicted = 0;
    for outcome in run_batch(engine, jobs, workers, now) {
        let base_revision = outcome.regeneration.base_revision;
        let record = outcome
            .regeneration
            .into_record(previous.get(&outcome.user_id));
        let sequence = record.fingerprint.sequence.clone();

        match store.compare_and_swap(record, base_revision) {
            Ok(()) => {
                stored += 1;
                println!("{:<24} {}", outcome.user_id, sequence);
            }
            Err(StoreError::Conflict { .. }) => {
                conflicted += 1;
                engine.audit().record_cas_conflict();
                tracing::warn!(user_id = %outcome.user_id, "record changed during batch, skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!("Stored {stored} fingerprint(s), {conflicted} skipped on conflict");
    Ok(())
}

/// Log files in `dir`, sorted by name.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|e| e == "json" || e == "jsonl")
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!("Store:       {:?}", config.store_path());
    println!();
    print_json(config)
}
