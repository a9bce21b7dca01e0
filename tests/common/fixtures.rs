//! Test fixture creation for input files and the movie database

#![allow(dead_code)]

use super::constants::*;
use movie_catalog::ingestion::{IngestionError, IngestionPipeline, IngestionSettings, IngestionSummary};
use movie_catalog::reports::{ReportGenerator, ReportRun, ReportSettings};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary data directory with `movies.csv`, `ratings.csv`, `tags.csv`.
///
/// The database and the report directory live inside it too, so that
/// everything is removed when the fixture is dropped.
pub struct TestDataDir {
    pub dir: TempDir,
}

impl TestDataDir {
    pub fn new(movies_csv: &str, ratings_csv: &str, tags_csv: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let data = Self { dir };
        data.write_inputs(movies_csv, ratings_csv, tags_csv);
        data
    }

    pub fn with_sample_inputs() -> Self {
        Self::new(SAMPLE_MOVIES_CSV, SAMPLE_RATINGS_CSV, SAMPLE_TAGS_CSV)
    }

    pub fn write_inputs(&self, movies_csv: &str, ratings_csv: &str, tags_csv: &str) {
        fs::write(self.movies_path(), movies_csv).unwrap();
        fs::write(self.ratings_path(), ratings_csv).unwrap();
        fs::write(self.tags_path(), tags_csv).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn movies_path(&self) -> PathBuf {
        self.path().join("movies.csv")
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.path().join("ratings.csv")
    }

    pub fn tags_path(&self) -> PathBuf {
        self.path().join("tags.csv")
    }

    pub fn db_path(&self) -> PathBuf {
        self.path().join("movies.db")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("analysis")
    }

    pub fn settings(&self, enforce_foreign_keys: bool) -> IngestionSettings {
        IngestionSettings {
            movies_path: self.movies_path(),
            ratings_path: self.ratings_path(),
            tags_path: self.tags_path(),
            db_path: self.db_path(),
            enforce_foreign_keys,
        }
    }

    pub fn load(&self, enforce_foreign_keys: bool) -> Result<IngestionSummary, IngestionError> {
        IngestionPipeline::new(self.settings(enforce_foreign_keys)).run()
    }

    pub fn analyze(&self, settings: ReportSettings) -> Vec<ReportRun> {
        ReportGenerator::new(self.db_path(), self.output_dir(), settings).run_all()
    }

    /// Read a report back as its header plus data records.
    pub fn read_report(&self, file_name: &str) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(self.output_dir().join(file_name)).unwrap();
        let headers = reader
            .headers()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();
        let records = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, records)
    }
}

/// Render `(user_id, movie_id, rating, timestamp)` tuples as a ratings CSV.
pub fn ratings_csv(ratings: &[(i64, i64, f64, i64)]) -> String {
    let mut csv = format!("{}\n", RATINGS_HEADER);
    for (user_id, movie_id, rating, timestamp) in ratings {
        csv.push_str(&format!("{},{},{:.1},{}\n", user_id, movie_id, rating, timestamp));
    }
    csv
}

/// `count` ratings of `movie_id` with the same value, one per user starting
/// at `first_user`.
pub fn repeated_ratings(
    movie_id: i64,
    rating: f64,
    count: usize,
    first_user: i64,
    timestamp: i64,
) -> Vec<(i64, i64, f64, i64)> {
    (0..count as i64)
        .map(|i| (first_user + i, movie_id, rating, timestamp))
        .collect()
}
