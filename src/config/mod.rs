mod file_config;

pub use file_config::{FileConfig, ReportsConfig};

use crate::ingestion::IngestionSettings;
use crate::reports::ReportSettings;
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MOVIES_FILE: &str = "movies.csv";
pub const DEFAULT_RATINGS_FILE: &str = "ratings.csv";
pub const DEFAULT_TAGS_FILE: &str = "tags.csv";
pub const DEFAULT_DB_FILE: &str = "movies.db";
pub const DEFAULT_OUTPUT_DIR: &str = "analysis";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub no_foreign_keys: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub movies_file: String,
    pub ratings_file: String,
    pub tags_file: String,
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub enforce_foreign_keys: bool,
    pub reports: ReportSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let movies_file = file
            .movies_file
            .unwrap_or_else(|| DEFAULT_MOVIES_FILE.to_string());
        let ratings_file = file
            .ratings_file
            .unwrap_or_else(|| DEFAULT_RATINGS_FILE.to_string());
        let tags_file = file
            .tags_file
            .unwrap_or_else(|| DEFAULT_TAGS_FILE.to_string());

        // The store lives next to the inputs unless placed elsewhere
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| data_dir.join(DEFAULT_DB_FILE));

        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| cli.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let enforce_foreign_keys = file
            .enforce_foreign_keys
            .unwrap_or(!cli.no_foreign_keys);

        let reports_file = file.reports.unwrap_or_default();
        let defaults = ReportSettings::default();
        let reports = ReportSettings {
            top_rated_min_ratings: reports_file
                .top_rated_min_ratings
                .unwrap_or(defaults.top_rated_min_ratings),
            top_limit: reports_file.top_limit.unwrap_or(defaults.top_limit),
            category_min_ratings: reports_file
                .category_min_ratings
                .unwrap_or(defaults.category_min_ratings),
        };
        if reports.top_limit == 0 {
            bail!("reports.top_limit must be greater than zero");
        }

        Ok(Self {
            data_dir,
            movies_file,
            ratings_file,
            tags_file,
            db_path,
            output_dir,
            enforce_foreign_keys,
            reports,
        })
    }

    pub fn movies_path(&self) -> PathBuf {
        self.data_dir.join(&self.movies_file)
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.data_dir.join(&self.ratings_file)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.data_dir.join(&self.tags_file)
    }

    /// Settings of an ingestion run. Requires the data directory to exist.
    pub fn ingestion_settings(&self) -> Result<IngestionSettings> {
        if !self.data_dir.exists() {
            bail!("Data directory does not exist: {:?}", self.data_dir);
        }
        if !self.data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", self.data_dir);
        }

        Ok(IngestionSettings {
            movies_path: self.movies_path(),
            ratings_path: self.ratings_path(),
            tags_path: self.tags_path(),
            db_path: self.db_path.clone(),
            enforce_foreign_keys: self.enforce_foreign_keys,
        })
    }
}
