use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_catalog::config::{AppConfig, CliConfig, FileConfig};
use movie_catalog::ingestion::IngestionPipeline;
use movie_catalog::reports::ReportGenerator;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "movie-catalog", version)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding movies.csv, ratings.csv and tags.csv.
    #[clap(long, global = true, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite movie database file. Defaults to <data-dir>/movies.db.
    #[clap(long, global = true, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Directory the CSV reports are written to.
    #[clap(long, global = true, value_parser = parse_path)]
    pub output_dir: Option<PathBuf>,

    /// Store ratings and tags even when they reference unknown movies.
    #[clap(long, global = true)]
    pub no_foreign_keys: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Loads the CSV inputs into the movie database, replacing its content.
    Load,

    /// Exports the analytics reports from the movie database.
    Analyze,

    /// Loads the CSV inputs, then exports the reports.
    Run,
}

impl CliArgs {
    fn cli_config(&self) -> CliConfig {
        CliConfig {
            data_dir: self.data_dir.clone(),
            db_path: self.db_path.clone(),
            output_dir: self.output_dir.clone(),
            no_foreign_keys: self.no_foreign_keys,
        }
    }
}

fn load(config: &AppConfig) -> Result<()> {
    let settings = config.ingestion_settings()?;
    let summary = IngestionPipeline::new(settings)
        .run()
        .context("Movie database setup failed")?;
    if !summary.missing_indices.is_empty() {
        info!(
            "Indexes not available: {}",
            summary.missing_indices.join(", ")
        );
    }
    Ok(())
}

fn analyze(config: &AppConfig) {
    let generator = ReportGenerator::new(
        &config.db_path,
        &config.output_dir,
        config.reports.clone(),
    );
    let runs = generator.run_all();
    let failed = runs.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        error!("{} of {} reports failed", failed, runs.len());
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.cli_config(), file_config)?;

    match cli_args.command {
        Command::Load => load(&config)?,
        Command::Analyze => analyze(&config),
        Command::Run => {
            load(&config)?;
            analyze(&config);
        }
    }
    Ok(())
}
