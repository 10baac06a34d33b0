//! Bookshop CLI - builds a book project into HTML, EPUB, MOBI or PDF

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bookshop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root containing config/ and book/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the book in one output format
    #[command(disable_help_flag = true)]
    Build {
        /// Output format (html, epub, mobi, pdf)
        #[arg(allow_hyphen_values = true)]
        format: Option<String>,

        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for reports
    let filter = if cli.verbose {
        "bookshop_cli=debug,bookshop_core=debug"
    } else {
        "bookshop_cli=info,bookshop_core=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Build { format, json } => commands::build(&cli.root, format.as_deref(), json),
    }
}
