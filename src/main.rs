//! # Workout Ingest CLI (`wki`)
//!
//! The `wki` binary runs the extraction pipeline over documents and manages
//! the template database.
//!
//! ## Usage
//!
//! ```bash
//! wki --config ./config/wki.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wki init` | Create the SQLite database and run schema migrations |
//! | `wki parse <file>` | Run the pipeline on one file and print the result as JSON |
//! | `wki import <path>` | Parse a file or directory and store the templates |
//! | `wki get <id>` | Print a stored template |
//! | `wki list` | List the most recent templates |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect how a document is parsed, including the strategy trace
//! wki parse ./programs/bench_press_12wk.pdf --debug
//!
//! # Import a folder with JSON progress on stderr
//! wki import ./programs --progress json
//!
//! # Re-import everything, even files seen before
//! wki import ./programs --full
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use workout_ingest::progress::ProgressMode;
use workout_ingest::{config, get, import, migrate, narrative, pipeline};

/// Workout Ingest: turn workout program documents into structured templates.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/wki.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "wki",
    about = "Workout Ingest: extract day-by-day workout schedules from arbitrary documents",
    version,
    long_about = "Workout Ingest reads PDFs, Word documents and text files that describe \
    multi-day training programs and produces structured schedules with a confidence score. \
    Damaged or unreadable inputs degrade through fallbacks instead of failing."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/wki.toml`. `parse` runs with built-in defaults
    /// when the file does not exist.
    #[arg(long, global = true, default_value = "./config/wki.toml")]
    config: PathBuf,

    /// Log filter (e.g. `info`, `debug`, `workout_ingest::segment=trace`).
    /// Overrides `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format on stderr: `text` or `json`.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the templates table.
    /// Running it multiple times is safe.
    Init,

    /// Parse one document and print the result as JSON.
    ///
    /// Nothing is stored. Without `--debug` the debug section (raw text,
    /// strategy trace, confidence breakdown) is omitted.
    Parse {
        /// Document to parse.
        file: PathBuf,

        /// Include raw text, strategy trace and confidence breakdown.
        #[arg(long)]
        debug: bool,

        /// Also print a narrative summary from the configured provider.
        #[arg(long)]
        summarize: bool,
    },

    /// Parse a file or directory and store the resulting templates.
    Import {
        /// File or directory to import.
        path: PathBuf,

        /// Run the pipeline but store nothing.
        #[arg(long)]
        dry_run: bool,

        /// Re-import documents whose content was imported before.
        #[arg(long)]
        full: bool,

        /// Print a narrative summary for each document.
        #[arg(long)]
        summarize: bool,

        /// Progress on stderr: `human`, `json` or `none`.
        /// Defaults to `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Print a stored template.
    Get {
        /// Template UUID.
        id: String,

        /// Print as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the most recent templates.
    List {
        /// Maximum number of templates to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn init_tracing(level: Option<&str>, format: &str) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        "json" => builder.json().init(),
        "text" => builder.init(),
        other => bail!("Unknown log format: '{}'. Must be text or json.", other),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref(), &cli.log_format)?;

    // Parsing needs no database; fall back to defaults without a config file
    if let Commands::Parse {
        file,
        debug,
        summarize,
    } = &cli.command
    {
        let cfg = if cli.config.exists() {
            config::load_config(&cli.config)?
        } else {
            config::Config::minimal()
        };
        let result = pipeline::process_file(file, &cfg.pipeline).await?;
        let mut json = serde_json::to_value(&result)?;
        if !debug {
            if let Some(obj) = json.as_object_mut() {
                obj.remove("debug");
            }
        }
        println!("{}", serde_json::to_string_pretty(&json)?);

        if *summarize {
            let enhancer = narrative::create_enhancer(&cfg.narrative)?;
            match enhancer.summarize(&result).await {
                Ok(summary) => println!("{}", summary),
                Err(e) => eprintln!("Warning: summary failed: {:#}", e),
            }
        }
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Parse { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Import {
            path,
            dry_run,
            full,
            summarize,
            progress,
        } => {
            let mode = match progress.as_deref() {
                Some(value) => match ProgressMode::parse(value) {
                    Some(mode) => mode,
                    None => bail!(
                        "Unknown progress mode: '{}'. Must be human, json or none.",
                        value
                    ),
                },
                None => ProgressMode::default_for_tty(),
            };
            import::run_import(&cfg, &path, dry_run, full, summarize, mode).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, &id, json).await?;
        }
        Commands::List { limit } => {
            get::run_list(&cfg, limit).await?;
        }
    }

    Ok(())
}
