//! Data-quality diagnostics for the raw inputs.
//!
//! Validation never blocks ingestion: it produces counts that are logged, and
//! a warning when movies have duplicate or missing identifiers or titles.

use super::source::{MovieRow, RatingRow};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Movie rows whose `movie_id` was already seen.
    pub duplicate_movies: usize,
    /// Rating rows identical to an earlier one on every column.
    pub duplicate_ratings: usize,
    /// Observed `(min, max)` rating, `None` without ratings.
    pub rating_range: Option<(f64, f64)>,
    pub null_movie_ids: usize,
    pub null_titles: usize,
}

impl ValidationReport {
    pub fn has_issues(&self) -> bool {
        self.duplicate_movies > 0 || self.null_movie_ids > 0 || self.null_titles > 0
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate movies: {}, duplicate ratings: {}, ",
            self.duplicate_movies, self.duplicate_ratings
        )?;
        match self.rating_range {
            Some((min, max)) => write!(f, "rating range: {} to {}, ", min, max)?,
            None => write!(f, "rating range: n/a, ")?,
        }
        write!(
            f,
            "null movie ids: {}, null titles: {}",
            self.null_movie_ids, self.null_titles
        )
    }
}

pub fn validate(movies: &[MovieRow], ratings: &[RatingRow]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen_movie_ids = HashSet::new();
    for movie in movies {
        match movie.movie_id {
            Some(movie_id) => {
                if !seen_movie_ids.insert(movie_id) {
                    report.duplicate_movies += 1;
                }
            }
            None => report.null_movie_ids += 1,
        }
        if movie.title.is_none() {
            report.null_titles += 1;
        }
    }

    let mut seen_ratings = HashSet::new();
    for rating in ratings {
        let key = (
            rating.user_id,
            rating.movie_id,
            rating.rating.to_bits(),
            rating.timestamp,
        );
        if !seen_ratings.insert(key) {
            report.duplicate_ratings += 1;
        }

        report.rating_range = Some(match report.rating_range {
            Some((min, max)) => (min.min(rating.rating), max.max(rating.rating)),
            None => (rating.rating, rating.rating),
        });
    }

    report
}
