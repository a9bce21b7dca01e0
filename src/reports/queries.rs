//! The fixed aggregations run against the movie store.
//!
//! Grouping by movie always goes through the `movie_id`; titles are only
//! carried along for the output.

use super::category::RatingCategory;
use super::export::ReportRow;
use crate::catalog_store::MovieStore;
use crate::ingestion::split_genres;
use anyhow::Result;
use rusqlite::params;
use serde::Serialize;
use std::collections::HashMap;

/// Thresholds and limits of the reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Minimum number of ratings for the top-rated report.
    pub top_rated_min_ratings: usize,
    /// Number of rows of the top-rated and most-rated reports.
    pub top_limit: usize,
    /// Minimum number of ratings for a movie to be categorized.
    pub category_min_ratings: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_rated_min_ratings: 50,
            top_limit: 20,
            category_min_ratings: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRatedMovie {
    pub title: String,
    pub avg_rating: f64,
    pub num_ratings: i64,
}

impl ReportRow for TopRatedMovie {
    const COLUMNS: &'static [&'static str] = &["title", "avg_rating", "num_ratings"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostRatedMovie {
    pub title: String,
    pub num_ratings: i64,
}

impl ReportRow for MostRatedMovie {
    const COLUMNS: &'static [&'static str] = &["title", "num_ratings"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCount {
    pub rating: f64,
    pub count: i64,
}

impl ReportRow for RatingCount {
    const COLUMNS: &'static [&'static str] = &["rating", "count"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub movie_count: i64,
}

impl ReportRow for GenreCount {
    const COLUMNS: &'static [&'static str] = &["genre", "movie_count"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    /// `YYYY-MM`, UTC.
    pub month: String,
    pub avg_rating: f64,
}

impl ReportRow for MonthlyAverage {
    const COLUMNS: &'static [&'static str] = &["month", "avg_rating"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub rating_category: RatingCategory,
    pub movie_count: i64,
}

impl ReportRow for CategoryCount {
    const COLUMNS: &'static [&'static str] = &["rating_category", "movie_count"];
}

/// Best mean ratings among movies with enough ratings.
pub fn top_rated_movies(store: &MovieStore, settings: &ReportSettings) -> Result<Vec<TopRatedMovie>> {
    let mut stmt = store.connection().prepare(
        "SELECT m.title, AVG(r.rating) AS avg_rating, COUNT(r.rating) AS num_ratings
         FROM movies m
         JOIN ratings r ON m.movie_id = r.movie_id
         GROUP BY m.movie_id
         HAVING num_ratings >= ?1
         ORDER BY avg_rating DESC, m.movie_id ASC
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(
            params![
                settings.top_rated_min_ratings as i64,
                settings.top_limit as i64
            ],
            |row| {
                Ok(TopRatedMovie {
                    title: row.get(0)?,
                    avg_rating: row.get(1)?,
                    num_ratings: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn most_rated_movies(store: &MovieStore, settings: &ReportSettings) -> Result<Vec<MostRatedMovie>> {
    let mut stmt = store.connection().prepare(
        "SELECT m.title, COUNT(r.rating) AS num_ratings
         FROM movies m
         JOIN ratings r ON m.movie_id = r.movie_id
         GROUP BY m.movie_id
         ORDER BY num_ratings DESC, m.movie_id ASC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![settings.top_limit as i64], |row| {
            Ok(MostRatedMovie {
                title: row.get(0)?,
                num_ratings: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn rating_distribution(store: &MovieStore) -> Result<Vec<RatingCount>> {
    let mut stmt = store.connection().prepare(
        "SELECT rating, COUNT(*) AS count
         FROM ratings
         GROUP BY rating
         ORDER BY rating",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RatingCount {
                rating: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Number of movies per genre label.
///
/// SQLite cannot split the `genres` column, so the labels are counted here.
/// Ties are ordered by genre name.
pub fn genre_popularity(store: &MovieStore) -> Result<Vec<GenreCount>> {
    let mut stmt = store
        .connection()
        .prepare("SELECT genres FROM movies WHERE genres IS NOT NULL AND genres != ''")?;
    let genre_fields = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(count_genres(genre_fields.iter().map(String::as_str)))
}

fn count_genres<'a>(genre_fields: impl Iterator<Item = &'a str>) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for field in genre_fields {
        for genre in split_genres(field) {
            *counts.entry(genre).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, movie_count)| GenreCount {
            genre: genre.to_string(),
            movie_count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.movie_count
            .cmp(&a.movie_count)
            .then_with(|| a.genre.cmp(&b.genre))
    });
    rows
}

/// Mean rating per calendar month of the rating timestamp.
pub fn rating_trends_over_time(store: &MovieStore) -> Result<Vec<MonthlyAverage>> {
    let mut stmt = store.connection().prepare(
        "SELECT STRFTIME('%Y-%m', timestamp, 'unixepoch') AS month, AVG(rating) AS avg_rating
         FROM ratings
         GROUP BY month
         ORDER BY month",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MonthlyAverage {
                month: row.get(0)?,
                avg_rating: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Number of movies per rating category, most frequent category first.
///
/// Categories with the same count keep their rank order, best first.
pub fn movies_by_rating_category(
    store: &MovieStore,
    settings: &ReportSettings,
) -> Result<Vec<CategoryCount>> {
    let mut stmt = store.connection().prepare(
        "SELECT AVG(r.rating) AS avg_rating
         FROM movies m
         JOIN ratings r ON m.movie_id = r.movie_id
         GROUP BY m.movie_id
         HAVING COUNT(r.rating) >= ?1",
    )?;
    let averages = stmt
        .query_map(params![settings.category_min_ratings as i64], |row| {
            row.get::<_, f64>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(count_categories(averages.into_iter()))
}

fn count_categories(averages: impl Iterator<Item = f64>) -> Vec<CategoryCount> {
    let mut counts: HashMap<RatingCategory, i64> = HashMap::new();
    for avg_rating in averages {
        *counts.entry(RatingCategory::from_average(avg_rating)).or_insert(0) += 1;
    }

    let mut rows: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(rating_category, movie_count)| CategoryCount {
            rating_category,
            movie_count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.movie_count
            .cmp(&a.movie_count)
            .then_with(|| a.rating_category.cmp(&b.rating_category))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_genres() {
        let rows = count_genres(
            ["Comedy|Drama| Romance ", "Drama", "Comedy|Drama", ""].into_iter(),
        );
        assert_eq!(
            rows,
            vec![
                GenreCount {
                    genre: "Drama".to_string(),
                    movie_count: 3
                },
                GenreCount {
                    genre: "Comedy".to_string(),
                    movie_count: 2
                },
                GenreCount {
                    genre: "Romance".to_string(),
                    movie_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_count_genres_breaks_ties_by_name() {
        let rows = count_genres(["Western|Action", "Sci-Fi"].into_iter());
        let genres: Vec<&str> = rows.iter().map(|r| r.genre.as_str()).collect();
        assert_eq!(genres, vec!["Action", "Sci-Fi", "Western"]);
    }

    #[test]
    fn test_count_categories_orders_by_frequency() {
        let rows = count_categories([2.0, 2.2, 1.0, 4.0, 3.5, 3.6].into_iter());
        assert_eq!(
            rows,
            vec![
                CategoryCount {
                    rating_category: RatingCategory::Poor,
                    movie_count: 3
                },
                CategoryCount {
                    rating_category: RatingCategory::Good,
                    movie_count: 2
                },
                CategoryCount {
                    rating_category: RatingCategory::Excellent,
                    movie_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_count_categories_ties_follow_rank() {
        let rows = count_categories([2.0, 3.2, 4.5].into_iter());
        let categories: Vec<RatingCategory> = rows.iter().map(|r| r.rating_category).collect();
        assert_eq!(
            categories,
            vec![
                RatingCategory::Excellent,
                RatingCategory::Average,
                RatingCategory::Poor
            ]
        );
    }
}
