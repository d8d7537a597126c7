//! procmap CLI - generate tile maps from a config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

/// procmap - rule-driven procedural tile maps
#[derive(Parser)]
#[command(name = "procmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a map from a config file
    Generate {
        /// Config file (.json or .toml)
        config: PathBuf,

        /// RNG seed; a random one is used when omitted
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a glyph legend after a text map
        #[arg(long)]
        legend: bool,
    },

    /// Validate a config file and print the resolved generator
    Describe {
        /// Config file (.json or .toml)
        config: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// One glyph per tile
    Text,
    /// Rows of tile names as JSON
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            config,
            seed,
            format,
            output,
            legend,
        } => {
            commands::generate::run(&config, seed, format, output.as_deref(), legend)?;
        }

        Commands::Describe { config } => {
            commands::describe::run(&config)?;
        }
    }

    Ok(())
}
