use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tunesmith_core::generation::{Duration, Genre, Mood};

mod commands;
mod simulated;

use simulated::SimulatedFailure;

#[derive(Parser)]
#[command(name = "tunesmith")]
#[command(about = "Tunesmith - generate short music clips from a text prompt", long_about = None)]
struct Cli {
    /// Settings file (defaults to settings.toml in the config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a generation and follow it until it resolves
    Generate {
        /// Text prompt
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// Use a canned prompt of the selected genre instead of --prompt
        #[arg(long)]
        preset: Option<usize>,

        #[arg(short, long, default_value_t = Genre::NoGenre)]
        genre: Genre,

        #[arg(short, long, default_value_t = Mood::NoMood)]
        mood: Mood,

        #[arg(short, long, default_value_t = Duration::TenSeconds)]
        duration: Duration,

        /// Unlock the full version for this run
        #[arg(long)]
        full_version: bool,

        /// Use a local simulated backend that answers after this many seconds
        #[arg(long)]
        simulate_secs: Option<u64>,

        /// Make the simulated backend fail
        #[arg(long, value_enum, requires = "simulate_secs")]
        simulate_failure: Option<SimulatedFailure>,

        /// Print navigation signals as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's usage against the free limit
    Quota,
    /// List prompt presets for a genre
    Presets {
        #[arg(short, long)]
        genre: Genre,
    },
}

fn setup_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err: Box<dyn std::error::Error + Send + Sync>| {
            anyhow!("failed to initialise tracing: {err}")
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prompt,
            preset,
            genre,
            mood,
            duration,
            full_version,
            simulate_secs,
            simulate_failure,
            json,
        } => {
            let args = commands::generate::GenerateArgs {
                prompt,
                preset,
                genre,
                mood,
                duration,
                full_version,
                simulate_secs,
                simulate_failure,
                json,
            };
            commands::generate::run(args, cli.settings).await?
        }
        Commands::Quota => commands::quota::run(cli.settings).await?,
        Commands::Presets { genre } => commands::presets::run(genre),
    }

    Ok(())
}
