//! stable-collector CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use stable_collector::{
    commands::{
        cmd_index, cmd_list_errors, cmd_query, cmd_status, print_error_entries, print_index_stats,
        print_query_results, print_status, IndexOptions, QueryOptions,
    },
    config::Config,
    error::Result,
    index::IndexStore,
    reader::PngReader,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stable-collector")]
#[command(version, about = "Index and search Stable Diffusion generation metadata", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a directory of generated images and update the index
    Index {
        /// Directory to index (defaults to search_root from the config)
        root: Option<PathBuf>,

        /// Discard the persisted index before walking
        #[arg(long)]
        reset: bool,

        /// Stop once the index holds this many entries
        #[arg(long)]
        max_files: Option<usize>,

        /// Index grid images too
        #[arg(long)]
        include_grids: bool,

        /// Recursion depth cap
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Search indexed records and print matching image paths
    Query {
        /// Search term; a random candidate from the config when omitted
        term: Option<String>,
    },

    /// Show config and index status
    Status,

    /// List index entries that failed to parse
    Errors,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle completions command (doesn't need config/store)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "stable-collector", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };
    let store = IndexStore::new(config.index_path());

    // Handle commands
    match cli.command {
        Commands::Index {
            root,
            reset,
            max_files,
            include_grids,
            max_depth,
        } => {
            let options = IndexOptions {
                root,
                reset,
                max_files,
                include_grids,
                max_depth,
            };

            let stats = cmd_index(&config, &store, PngReader, options)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_index_stats(&stats);
            }
        }

        Commands::Query { term } => {
            let output = cmd_query(&config, &store, QueryOptions { term })?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_query_results(&output);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &store)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Errors => {
            let entries = cmd_list_errors(&store)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_error_entries(&entries);
            }
        }

        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
