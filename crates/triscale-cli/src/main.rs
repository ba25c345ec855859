//! triscale CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "triscale", version, about = "ENEM-style TRI cohort scoring engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a cohort of students against a reference table
    Score {
        /// Path to the reference table CSV
        #[arg(long)]
        table: PathBuf,

        /// Path to the cohort JSON (answer key, areas, students)
        #[arg(long)]
        cohort: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./triscale-results")]
        output: PathBuf,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Worker threads for the scoring pass (0 = number of cores)
        #[arg(long, default_value = "0")]
        parallelism: usize,
    },

    /// Validate a reference table and optionally a cohort file
    Validate {
        /// Path to the reference table CSV
        #[arg(long)]
        table: PathBuf,

        /// Optional cohort JSON to cross-check against the table
        #[arg(long)]
        cohort: Option<PathBuf>,
    },

    /// Create a starter reference table and example cohort
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triscale=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            table,
            cohort,
            output,
            format,
            parallelism,
        } => commands::score::execute(table, cohort, output, format, parallelism),
        Commands::Validate { table, cohort } => commands::validate::execute(table, cohort),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
