//! Word Filter - CLI
//!
//! Runs the HTTP service by default; the other subcommands operate on the
//! configured collection directly from the terminal.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use word_filter::{
    commands::{run_cleanup, run_lookup, run_serve, run_validate},
    config::{DictionaryArgs, ServerArgs, StorageArgs, ValidationArgs, load_engine},
    output::{
        print_backup_report, print_cleanup_report, print_lookup_result, print_stats,
        print_validation_report,
    },
};

#[derive(Parser)]
#[command(
    name = "word_filter",
    about = "Word collection service with filtered queries, pattern matching and dictionary validation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    storage: StorageArgs,

    #[command(flatten)]
    dictionary: DictionaryArgs,

    #[command(flatten)]
    validation: ValidationArgs,

    #[command(flatten)]
    server: ServerArgs,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve,

    /// Check every word against the dictionary
    Validate,

    /// Find words the dictionary rejects and optionally remove them
    Cleanup {
        /// Remove the invalid words instead of only reporting them
        #[arg(long)]
        auto_remove: bool,
    },

    /// Look up a single word
    Lookup {
        /// Word to look up
        word: String,
    },

    /// Show collection and cache statistics
    Stats,

    /// Write a timestamped copy of the collection next to the live one
    Backup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let engine = load_engine(&cli.storage, &cli.dictionary).await?;
    let options = cli.validation.options();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_serve(Arc::new(engine), options, &cli.server.config()).await,
        Commands::Validate => {
            let report = run_validate(&engine, options).await;
            print_validation_report(&report);
            Ok(())
        }
        Commands::Cleanup { auto_remove } => {
            let report = run_cleanup(&engine, options, auto_remove).await?;
            print_cleanup_report(&report, engine.len());
            Ok(())
        }
        Commands::Lookup { word } => {
            let (result, in_collection) = run_lookup(&engine, &word).await?;
            print_lookup_result(&result);
            let membership = if in_collection {
                "in collection".green()
            } else {
                "not in collection".yellow()
            };
            println!("   {membership}");
            Ok(())
        }
        Commands::Stats => {
            print_stats(&engine.stats(), &engine.cache_stats());
            Ok(())
        }
        Commands::Backup => {
            print_backup_report(&engine.backup().await?);
            Ok(())
        }
    }
}
