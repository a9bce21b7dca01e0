//! Runs the reports and exports each to its own CSV file.
//!
//! Every report opens its own read-only store handle and is isolated from
//! the others: a failing report is logged and left out of the output set.

use super::export::write_csv;
use super::queries::{
    genre_popularity, most_rated_movies, movies_by_rating_category, rating_distribution,
    rating_trends_over_time, top_rated_movies, RatingCount, ReportSettings,
};
use crate::catalog_store::MovieStore;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportKind {
    TopRatedMovies,
    MostRatedMovies,
    RatingDistribution,
    GenrePopularity,
    RatingTrends,
    MoviesByCategory,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::TopRatedMovies,
        ReportKind::MostRatedMovies,
        ReportKind::RatingDistribution,
        ReportKind::GenrePopularity,
        ReportKind::RatingTrends,
        ReportKind::MoviesByCategory,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ReportKind::TopRatedMovies => "top_rated_movies.csv",
            ReportKind::MostRatedMovies => "most_rated_movies.csv",
            ReportKind::RatingDistribution => "rating_distribution.csv",
            ReportKind::GenrePopularity => "genre_popularity.csv",
            ReportKind::RatingTrends => "rating_trends_time.csv",
            ReportKind::MoviesByCategory => "movies_by_category.csv",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReportKind::TopRatedMovies => "top rated movies",
            ReportKind::MostRatedMovies => "most rated movies",
            ReportKind::RatingDistribution => "rating distribution",
            ReportKind::GenrePopularity => "genre popularity",
            ReportKind::RatingTrends => "rating trends over time",
            ReportKind::MoviesByCategory => "movies by rating category",
        }
    }
}

/// A report file that was written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub rows: usize,
    /// One-line digest of the result, absent for an empty report.
    pub highlight: Option<String>,
}

#[derive(Debug)]
pub struct ReportRun {
    pub kind: ReportKind,
    pub result: Result<ReportOutput>,
}

impl ReportRun {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct ReportGenerator {
    db_path: PathBuf,
    output_dir: PathBuf,
    settings: ReportSettings,
}

impl ReportGenerator {
    pub fn new<P: AsRef<Path>, O: AsRef<Path>>(
        db_path: P,
        output_dir: O,
        settings: ReportSettings,
    ) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            settings,
        }
    }

    /// Run every report, in order, returning one outcome per report.
    pub fn run_all(&self) -> Vec<ReportRun> {
        if !self.output_dir.exists() {
            match std::fs::create_dir_all(&self.output_dir) {
                Ok(()) => info!("Created output directory {:?}", self.output_dir),
                Err(e) => error!(
                    "Failed to create output directory {:?}: {}",
                    self.output_dir, e
                ),
            }
        }

        info!("Running movie analytics");
        let runs: Vec<ReportRun> = ReportKind::ALL
            .iter()
            .map(|kind| {
                info!("Analyzing {}...", kind.description());
                let result = self.run(*kind);
                match &result {
                    Ok(output) => {
                        info!("Exported {} rows to {:?}", output.rows, output.path);
                        if let Some(highlight) = &output.highlight {
                            info!("{}", highlight);
                        }
                    }
                    Err(e) => error!("Failed to export {}: {:#}", kind.description(), e),
                }
                ReportRun {
                    kind: *kind,
                    result,
                }
            })
            .collect();

        log_summary(&self.output_dir, &runs);
        runs
    }

    /// Compute a single report and write its file.
    ///
    /// The file of a previous run is removed first, so a failed report
    /// leaves no output behind.
    pub fn run(&self, kind: ReportKind) -> Result<ReportOutput> {
        let path = self.output_dir.join(kind.file_name());
        remove_previous_output(&path)?;

        let store = MovieStore::open_read_only(&self.db_path)?;
        let settings = &self.settings;

        let (rows, highlight) = match kind {
            ReportKind::TopRatedMovies => {
                let movies = top_rated_movies(&store, settings)?;
                let highlight = movies.first().map(|m| {
                    format!(
                        "Top movie: {} ({:.2}, {} ratings)",
                        m.title, m.avg_rating, m.num_ratings
                    )
                });
                (write_csv(&path, &movies)?, highlight)
            }
            ReportKind::MostRatedMovies => {
                let movies = most_rated_movies(&store, settings)?;
                let highlight = movies
                    .first()
                    .map(|m| format!("Most rated: {} ({} ratings)", m.title, m.num_ratings));
                (write_csv(&path, &movies)?, highlight)
            }
            ReportKind::RatingDistribution => {
                let counts = rating_distribution(&store)?;
                let highlight = most_common_rating(&counts).map(|c| {
                    format!("Most common rating: {} ({} ratings)", c.rating, c.count)
                });
                (write_csv(&path, &counts)?, highlight)
            }
            ReportKind::GenrePopularity => {
                let genres = genre_popularity(&store)?;
                let highlight = (!genres.is_empty()).then(|| {
                    let top: Vec<&str> = genres.iter().take(3).map(|g| g.genre.as_str()).collect();
                    format!("Top genres: {}", top.join(", "))
                });
                (write_csv(&path, &genres)?, highlight)
            }
            ReportKind::RatingTrends => {
                let months = rating_trends_over_time(&store)?;
                let highlight = match (months.first(), months.last()) {
                    (Some(first), Some(last)) => {
                        Some(format!("Date range: {} to {}", first.month, last.month))
                    }
                    _ => None,
                };
                (write_csv(&path, &months)?, highlight)
            }
            ReportKind::MoviesByCategory => {
                let categories = movies_by_rating_category(&store, settings)?;
                let highlight = (!categories.is_empty()).then(|| {
                    let breakdown: Vec<String> = categories
                        .iter()
                        .map(|c| format!("{}: {}", c.rating_category, c.movie_count))
                        .collect();
                    format!("Category breakdown: {}", breakdown.join(", "))
                });
                (write_csv(&path, &categories)?, highlight)
            }
        };

        store
            .close()
            .with_context(|| format!("Failed to release store after {}", kind.description()))?;

        Ok(ReportOutput {
            kind,
            path,
            rows,
            highlight,
        })
    }
}

fn remove_previous_output(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed previous report {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove previous report {:?}", path)),
    }
}

/// The rating with the highest count, the lowest rating among ties.
fn most_common_rating(counts: &[RatingCount]) -> Option<&RatingCount> {
    counts.iter().fold(None, |best, count| match best {
        Some(best) if best.count >= count.count => Some(best),
        _ => Some(count),
    })
}

fn log_summary(output_dir: &Path, runs: &[ReportRun]) {
    let exported = runs.iter().filter(|r| r.is_success()).count();
    info!(
        "Analysis complete: {} of {} reports saved in {:?}",
        exported,
        runs.len(),
        output_dir
    );
    for run in runs {
        match &run.result {
            Ok(output) => info!("  {}", output.kind.file_name()),
            Err(_) => warn!("  {} (failed)", run.kind.file_name()),
        }
    }
}
