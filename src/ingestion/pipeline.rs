//! The ingestion run: raw CSV inputs in, populated movie store out.

use super::source::{MovieRow, RatingRow, TagRow, MOVIES_SOURCE, RATINGS_SOURCE, TAGS_SOURCE};
use super::title::{clean_title, extract_year, normalize_genres};
use super::validation::{validate, ValidationReport};
use crate::catalog_store::{
    Movie, MovieStore, Rating, ReplaceCounts, StoreStats, Tag, RELEASE_YEAR_UNKNOWN,
};
use anyhow::Context;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const PREVIEW_ROWS: usize = 5;

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Failed to read input: {0:#}")]
    Input(anyhow::Error),

    #[error("Failed to prepare the movie database: {0:#}")]
    Schema(anyhow::Error),

    #[error("Failed to insert data into the movie database: {0:#}")]
    Persist(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct IngestionSettings {
    pub movies_path: PathBuf,
    pub ratings_path: PathBuf,
    pub tags_path: PathBuf,
    pub db_path: PathBuf,
    pub enforce_foreign_keys: bool,
}

#[derive(Debug, Clone)]
pub struct IngestionSummary {
    pub validation: ValidationReport,
    /// Movies without a derivable release year (stored with year 0).
    pub movies_without_year: usize,
    /// Movie rows left out because their id or title is missing.
    pub skipped_movies: usize,
    pub written: ReplaceCounts,
    /// Indices that could not be created.
    pub missing_indices: Vec<&'static str>,
    pub stats: StoreStats,
}

/// Movies ready for persistence, plus what was learned deriving them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedMovies {
    pub movies: Vec<Movie>,
    pub movies_without_year: usize,
    pub skipped: usize,
}

/// Derive `release_year`, normalize `genres` and project onto the stored columns.
pub fn prepare_movies(rows: &[MovieRow]) -> PreparedMovies {
    let mut prepared = PreparedMovies::default();

    for (index, row) in rows.iter().enumerate() {
        let release_year = row.title.as_deref().and_then(extract_year);
        if release_year.is_none() {
            prepared.movies_without_year += 1;
        }
        if index < PREVIEW_ROWS {
            if let Some(title) = row.title.as_deref() {
                debug!(
                    "{:?} -> clean title {:?}, release year {:?}",
                    title,
                    clean_title(title),
                    release_year
                );
            }
        }

        let (Some(movie_id), Some(title)) = (row.movie_id, row.title.as_ref()) else {
            prepared.skipped += 1;
            continue;
        };
        prepared.movies.push(Movie {
            movie_id,
            title: title.clone(),
            genres: normalize_genres(row.genres.as_deref()),
            release_year: release_year.unwrap_or(RELEASE_YEAR_UNKNOWN),
        });
    }

    prepared
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            timestamp: row.timestamp,
        }
    }
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            user_id: row.user_id,
            movie_id: row.movie_id,
            tag: row.tag,
            timestamp: row.timestamp,
        }
    }
}

pub struct IngestionPipeline {
    settings: IngestionSettings,
}

impl IngestionPipeline {
    pub fn new(settings: IngestionSettings) -> Self {
        Self { settings }
    }

    pub fn run(&self) -> Result<IngestionSummary, IngestionError> {
        let settings = &self.settings;

        if let Some(parent) = settings.db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))
                .map_err(IngestionError::Schema)?;
        }
        info!("Opening movie database at {:?}...", settings.db_path);
        let mut store = MovieStore::open(&settings.db_path, settings.enforce_foreign_keys)
            .map_err(IngestionError::Schema)?;

        info!("Reading input files...");
        let movie_rows: Vec<MovieRow> = MOVIES_SOURCE
            .read_file(&settings.movies_path)
            .map_err(IngestionError::Input)?;
        let rating_rows: Vec<RatingRow> = RATINGS_SOURCE
            .read_file(&settings.ratings_path)
            .map_err(IngestionError::Input)?;
        let tag_rows: Vec<TagRow> = TAGS_SOURCE
            .read_file(&settings.tags_path)
            .map_err(IngestionError::Input)?;
        info!(
            "Read {} movies, {} ratings, {} tags",
            movie_rows.len(),
            rating_rows.len(),
            tag_rows.len()
        );

        let prepared = prepare_movies(&movie_rows);
        info!("Movies without year: {}", prepared.movies_without_year);

        info!("Validating data...");
        let validation = validate(&movie_rows, &rating_rows);
        info!("{}", validation);
        if validation.has_issues() {
            warn!("Data quality issues detected!");
        } else {
            info!("Data validation passed");
        }
        if prepared.skipped > 0 {
            warn!(
                "Leaving out {} movies without id or title",
                prepared.skipped
            );
        }

        let ratings: Vec<Rating> = rating_rows.into_iter().map(Rating::from).collect();
        let tags: Vec<Tag> = tag_rows.into_iter().map(Tag::from).collect();

        info!("Inserting data into database...");
        let written = match store.replace_all(&prepared.movies, &ratings, &tags) {
            Ok(written) => written,
            Err(e) => {
                error!("Error inserting data: {:#}", e);
                if let Err(close_err) = store.close() {
                    warn!("{:#}", close_err);
                }
                return Err(IngestionError::Persist(e));
            }
        };

        info!("Creating indexes...");
        if let Err(e) = store.create_indices() {
            warn!("Warning creating indexes: {:#}", e);
        }
        let missing_indices = store.missing_indices().unwrap_or_else(|e| {
            warn!("Could not list indexes: {:#}", e);
            Vec::new()
        });

        let stats = read_stats(&store);
        store.close().map_err(IngestionError::Persist)?;

        let summary = IngestionSummary {
            validation,
            movies_without_year: prepared.movies_without_year,
            skipped_movies: prepared.skipped,
            written,
            missing_indices,
            stats,
        };
        log_summary(&summary, settings);
        Ok(summary)
    }
}

/// Statistics of the committed store. The data is already written at this
/// point, so a failed read only degrades the summary.
fn read_stats(store: &MovieStore) -> StoreStats {
    store.stats().unwrap_or_else(|e| {
        warn!(
            "Could not read statistics of {:?}: {:#}",
            store.db_path(),
            e
        );
        StoreStats::default()
    })
}

fn log_summary(summary: &IngestionSummary, settings: &IngestionSettings) {
    let stats = &summary.stats;
    info!("Database setup complete");
    info!("Database location: {}", settings.db_path.display());
    info!("Total movies: {}", stats.movies);
    info!("Total ratings: {}", stats.ratings);
    info!("Total tags: {}", stats.tags);
    info!("Unique users: {}", stats.unique_users);
    match stats.average_rating {
        Some(average) => info!("Average rating: {:.2}", average),
        None => info!("Average rating: n/a"),
    }
    info!("Movies with release year: {}", stats.movies_with_release_year);
}
