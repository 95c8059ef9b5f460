mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imagepress_core::config::PipelineConfig;
use imagepress_core::Pipeline;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// ImagePress: derivative pipeline for uploaded photographs
#[derive(Parser)]
#[command(name = "imagepress", version, about)]
struct Cli {
    /// Path to the catalog database
    #[arg(long, global = true, env = "IMAGEPRESS_CATALOG", default_value_t = default_catalog_path())]
    catalog: String,

    /// Directory that catalog paths are relative to
    #[arg(long, global = true, env = "IMAGEPRESS_CONTENT_ROOT", default_value = ".")]
    content_root: PathBuf,

    /// Lock file shared by overlapping runs (default: beside the catalog)
    #[arg(long, global = true, env = "IMAGEPRESS_LOCK_FILE")]
    lock_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate web and thumbnail renditions for unprocessed images
    Process {
        /// Process at most this many images (0 = no limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Clear all derivative state first so every image is regenerated
        #[arg(long)]
        reprocess: bool,
    },
    /// Show catalog counts and available codecs
    Status,
    /// Add originals already stored under the content root to the catalog
    Register {
        /// Paths relative to the content root
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn default_catalog_path() -> String {
    dirs_path().to_string_lossy().to_string()
}

fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".imagepress").join("catalog.db")
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(std::io::stdout)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let catalog_path = PathBuf::from(&cli.catalog);
    let mut config = PipelineConfig::new(&cli.content_root, &catalog_path);
    if let Some(lock_file) = cli.lock_file {
        config = config.with_lock_path(lock_file);
    }

    match cli.command {
        Commands::Process { limit, reprocess } => {
            let config = config.with_limit(limit).with_reprocess(reprocess);
            let mut pipeline = open(&catalog_path, config)?;
            commands::process::run(&mut pipeline)
        }
        Commands::Status => {
            let pipeline = open(&catalog_path, config)?;
            commands::status::run(&pipeline)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Register { paths } => {
            let pipeline = open(&catalog_path, config)?;
            commands::register::run(&pipeline, &paths)
        }
    }
}

fn open(catalog_path: &std::path::Path, config: PipelineConfig) -> Result<Pipeline> {
    Pipeline::open(catalog_path, config)
        .with_context(|| format!("failed to open catalog {}", catalog_path.display()))
}
