//! Movie catalog models as persisted in the SQLite store.

use serde::Serialize;

/// Value of `release_year` when the year could not be derived from the title.
pub const RELEASE_YEAR_UNKNOWN: i64 = 0;

/// A row of the `movies` table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub movie_id: i64,
    /// Original title, including the trailing `(YYYY)` annotation if any.
    pub title: String,
    /// Genre labels joined by `|`, empty when no genre is known.
    pub genres: String,
    pub release_year: i64,
}

/// A row of the `ratings` table, without the surrogate `rating_id`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rating {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f64,
    /// Unix epoch seconds.
    pub timestamp: i64,
}

/// A row of the `tags` table, without the surrogate `tag_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub user_id: i64,
    pub movie_id: i64,
    pub tag: String,
    /// Unix epoch seconds.
    pub timestamp: i64,
}

/// Number of rows written by a full replace of the catalog tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceCounts {
    pub movies: usize,
    pub ratings: usize,
    pub tags: usize,
}

/// Aggregate figures read back from a populated store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreStats {
    pub movies: usize,
    pub ratings: usize,
    pub tags: usize,
    pub unique_users: usize,
    pub average_rating: Option<f64>,
    pub movies_with_release_year: usize,
}
