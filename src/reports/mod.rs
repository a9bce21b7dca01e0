//! Aggregate reports over a populated movie store.

mod category;
mod export;
mod queries;
mod runner;

pub use category::RatingCategory;
pub use export::{write_csv, write_rows, ReportRow};
pub use queries::{
    genre_popularity, most_rated_movies, movies_by_rating_category, rating_distribution,
    rating_trends_over_time, top_rated_movies, CategoryCount, GenreCount, MonthlyAverage,
    MostRatedMovie, RatingCount, ReportSettings, TopRatedMovie,
};
pub use runner::{ReportGenerator, ReportKind, ReportOutput, ReportRun};
