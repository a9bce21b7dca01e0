mod models;
mod schema;
mod store;

pub use models::*;
pub use schema::{MOVIE_CATALOG_SCHEMA, MOVIES_TABLE_NAME, RATINGS_TABLE_NAME, TAGS_TABLE_NAME};
pub use store::MovieStore;
