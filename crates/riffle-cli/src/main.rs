//! # Riffle CLI
//!
//! Command-line interface for the Riffle CSV search tool.
//!
//! ## Commands
//!
//! - `riffle search <file> [query]` - Load a CSV and filter its rows
//! - `riffle fields <file>` - Show the header fields and record count
//! - `riffle interactive <file>` - Search-as-you-type TUI mode
//!
//! ## Example Usage
//!
//! ```bash
//! # One-shot search
//! riffle search people.csv "bob"
//!
//! # Full record set as JSON
//! riffle search people.csv --all --output json
//!
//! # Interactive search, seeded with an initial query
//! riffle interactive people.csv --query "bob"
//! ```

mod app;
mod commands;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Riffle - load a CSV and filter its rows as you type
#[derive(Parser)]
#[command(name = "riffle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV file and filter its rows by a query
    Search {
        /// Path to the CSV file to load
        file: PathBuf,

        /// Query text; matched case-insensitively against every field.
        /// Omitting it is an error unless --all is given.
        query: Option<String>,

        /// Return the full record set (equivalent to an empty query)
        #[arg(short, long)]
        all: bool,

        /// Maximum number of rows to print
        #[arg(short, long, default_value = "100")]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show header fields and statistics for a CSV file
    Fields {
        /// Path to the CSV file to load
        file: PathBuf,
    },

    /// Start interactive search-as-you-type mode
    #[command(alias = "i")]
    Interactive {
        /// Path to the CSV file to load
        file: PathBuf,

        /// Initial query, as if carried by the location on load
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => riffle_core::Config::load_from(path)?,
        None => riffle_core::Config::load()?,
    };

    // Execute command
    match cli.command {
        Commands::Search {
            file,
            query,
            all,
            limit,
            output,
        } => commands::search::run(config, &file, query, all, limit, output),
        Commands::Fields { file } => commands::fields::run(config, &file),
        Commands::Interactive { file, query } => tui::run(config, &file, query),
    }
}
