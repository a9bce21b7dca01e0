//! Ingestion of the MovieLens style CSV inputs into the movie store.
//!
//! 1. The store schema is created if missing
//! 2. `movies.csv`, `ratings.csv` and `tags.csv` are read, with the source
//!    column names mapped onto the canonical ones
//! 3. Release years are derived from the titles, genres normalized
//! 4. The inputs are validated (diagnostics only)
//! 5. All three tables are replaced in one transaction
//! 6. Lookup indices are created

mod pipeline;
mod source;
mod title;
mod validation;

pub use pipeline::{
    prepare_movies, IngestionError, IngestionPipeline, IngestionSettings, IngestionSummary,
    PreparedMovies,
};
pub use source::{
    MovieRow, RatingRow, SourceTable, TagRow, MOVIES_SOURCE, RATINGS_SOURCE, TAGS_SOURCE,
};
pub use title::{
    clean_title, extract_year, normalize_genres, split_genres, GENRE_SEPARATOR,
    NO_GENRES_PLACEHOLDER,
};
pub use validation::{validate, ValidationReport};
