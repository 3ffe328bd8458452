//! CLI application for splitting composite invoice PDFs.

mod commands;
mod logging;
mod notify;

use clap::{Parser, Subcommand};

use commands::{batch, config, inspect, split};

/// Split composite invoice PDFs, keeping the last page of every invoice
#[derive(Parser)]
#[command(name = "invsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a single composite PDF
    Split(split::SplitArgs),

    /// Split every composite PDF in the source folder
    Batch(batch::BatchArgs),

    /// Show the per-page signals and resolved invoices of a PDF
    Inspect(inspect::InspectArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config management must work even when the current file is broken
    if let Commands::Config(args) = cli.command {
        logging::init(cli.verbose, None)?;
        return config::run(args, cli.config.as_deref());
    }

    let settings = config::load_config(cli.config.as_deref())?;

    // The batch log file lives next to the folders it processes
    let log_file = match &cli.command {
        Commands::Batch(args) => batch::log_file(args, &settings)?,
        _ => None,
    };
    logging::init(cli.verbose, log_file.as_deref())?;

    match cli.command {
        Commands::Split(args) => split::run(args, &settings),
        Commands::Batch(args) => batch::run(args, &settings),
        Commands::Inspect(args) => inspect::run(args, &settings),
        Commands::Config(args) => config::run(args, cli.config.as_deref()),
    }
}
