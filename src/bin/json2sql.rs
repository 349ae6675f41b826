//! json2sql CLI - render JSON change records as SQL statements
//!
//! Statements go to stdout (or `--output`); logs go to stderr.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use json2sql::{ConvertConfig, InputMode, OutputTarget, DEFAULT_PARTITIONED_INPUT};

#[derive(Parser)]
#[command(name = "json2sql")]
#[command(version, about = "Convert JSON change records to INSERT/UPDATE/DELETE statements", long_about = None)]
struct Cli {
    /// Write statements to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// Name of the SQL table to insert/update/delete rows in
    #[arg(env = "JSON2SQL_TABLE")]
    table_name: String,

    /// Unique identifier field for UPDATE and DELETE statements
    #[arg(env = "JSON2SQL_UNIQUE_ID")]
    unique_id: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Input is a list of records, each with its own Status
    Flat {
        #[command(flatten)]
        target: Target,

        /// JSON file to process
        #[arg(env = "JSON2SQL_INPUT")]
        json_file: PathBuf,
    },

    /// Input is [[deletes...], [creates and updates...]]
    Partitioned {
        #[command(flatten)]
        target: Target,

        /// JSON file to process
        #[arg(env = "JSON2SQL_INPUT", default_value = DEFAULT_PARTITIONED_INPUT)]
        json_file: PathBuf,
    },
}

fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (target, json_file, mode) = match cli.command {
        Commands::Flat { target, json_file } => (target, json_file, InputMode::Flat),
        Commands::Partitioned { target, json_file } => (target, json_file, InputMode::Partitioned),
    };

    let output = match cli.output {
        Some(path) => OutputTarget::File(path),
        None => OutputTarget::Stdout,
    };

    let config = ConvertConfig::new(target.table_name, target.unique_id, json_file, mode)
        .with_output(output);

    match json2sql::run(&config) {
        Ok(summary) => {
            tracing::info!(
                "Wrote {} statements ({} inserts, {} updates, {} deletes), skipped {} records",
                summary.statement_count(),
                summary.insert_count,
                summary.update_count,
                summary.delete_count,
                summary.skipped_count
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout carries only SQL. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
