use clap::{ArgAction, Parser, Subcommand};
use commands::{cache, clear, sync};
use std::path::PathBuf;
use trakt_sync_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trakt-sync")]
#[command(about = "Keep a local media library and Trakt in step")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to the daily rotated log file instead of stderr
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one two-way sync pass
    #[command(long_about = "Reconcile the local library with Trakt: apply remote watched/unwatched changes locally, then push local plays and collection entries Trakt is missing. Without --movies or --series the passes enabled in config.toml run.")]
    Sync {
        /// Sync movies
        #[arg(long, action = ArgAction::SetTrue)]
        movies: bool,

        /// Sync series episodes
        #[arg(long, action = ArgAction::SetTrue)]
        series: bool,

        /// Library snapshot to sync (overrides sync.library_file)
        #[arg(long, value_name = "PATH")]
        library: Option<PathBuf>,
    },
    /// Inspect the persisted sync cache
    Cache {
        #[command(subcommand)]
        cmd: CacheCommands,
    },
    /// Remove the persisted sync cache
    #[command(long_about = "Delete the persisted watermark and cached Trakt payloads. The next sync refetches everything. Use this to recover from a corrupted cache.")]
    Clear,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show saved watermarks and record counts
    Status,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli.log_to_file.then(|| PathManager::default().log_file());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Sync {
            movies,
            series,
            library,
        } => sync::run_sync(movies, series, library, &output).await,
        Commands::Cache { cmd } => match cmd {
            CacheCommands::Status => cache::run_status(&output).await,
        },
        Commands::Clear => clear::run_clear(&output).await,
    }
}
