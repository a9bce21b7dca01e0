use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Input and output locations (can override CLI)
    pub data_dir: Option<String>,
    pub movies_file: Option<String>,
    pub ratings_file: Option<String>,
    pub tags_file: Option<String>,
    pub db_path: Option<String>,
    pub output_dir: Option<String>,
    pub enforce_foreign_keys: Option<bool>,

    pub reports: Option<ReportsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ReportsConfig {
    pub top_rated_min_ratings: Option<usize>,
    pub top_limit: Option<usize>,
    pub category_min_ratings: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
