//! SQLite schema definitions for the movie catalog database.
//!
//! Ratings and tags declare foreign keys to `movies`. Whether SQLite enforces
//! them depends on the `foreign_keys` pragma set when the store is opened.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

pub const MOVIES_TABLE_NAME: &str = "movies";
pub const RATINGS_TABLE_NAME: &str = "ratings";
pub const TAGS_TABLE_NAME: &str = "tags";

const MOVIE_FK: ForeignKey = ForeignKey {
    foreign_table: MOVIES_TABLE_NAME,
    foreign_column: "movie_id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const MOVIES_TABLE: Table = Table {
    name: MOVIES_TABLE_NAME,
    columns: &[
        sqlite_column!("movie_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("genres", &SqlType::Text), // '|' separated, '' when unknown
        sqlite_column!("release_year", &SqlType::Integer), // 0 when unknown
    ],
    indices: &[],
};

const RATINGS_TABLE: Table = Table {
    name: RATINGS_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "rating_id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!(
            "rating",
            &SqlType::Real,
            non_null = true,
            check = Some("rating >= 0.5 AND rating <= 5.0")
        ),
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true), // unix seconds
    ],
    indices: &[
        ("idx_ratings_movie", "movie_id"),
        ("idx_ratings_user", "user_id"),
    ],
};

const TAGS_TABLE: Table = Table {
    name: TAGS_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "tag_id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!("tag", &SqlType::Text, non_null = true),
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_tags_movie", "movie_id")],
};

pub const MOVIE_CATALOG_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[MOVIES_TABLE, RATINGS_TABLE, TAGS_TABLE],
};
