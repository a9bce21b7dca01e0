//! SQLite-backed movie catalog store.
//!
//! A `MovieStore` owns a single connection. It is opened at the start of a
//! logical operation (an ingestion run, a report) and closed at its end;
//! dropping the store closes the connection on early-return paths.

use super::models::{Movie, Rating, ReplaceCounts, StoreStats, Tag};
use super::schema::{MOVIE_CATALOG_SCHEMA, MOVIES_TABLE_NAME, RATINGS_TABLE_NAME, TAGS_TABLE_NAME};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct MovieStore {
    conn: Connection,
    db_path: PathBuf,
}

impl MovieStore {
    /// Open (or create) the store for writing.
    ///
    /// Missing tables are created; existing tables must match the declared
    /// schema. With `enforce_foreign_keys` the ratings and tags inserts are
    /// rejected when they reference an unknown movie.
    pub fn open<P: AsRef<Path>>(db_path: P, enforce_foreign_keys: bool) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open movie database {:?}", db_path))?;

        conn.pragma_update(None, "foreign_keys", enforce_foreign_keys)?;

        MOVIE_CATALOG_SCHEMA
            .create(&conn)
            .context("Failed to create movie catalog schema")?;
        MOVIE_CATALOG_SCHEMA
            .validate(&conn)
            .context("Existing movie database has an incompatible schema")?;

        debug!(
            "Opened movie database {:?} (foreign keys enforced: {})",
            db_path, enforce_foreign_keys
        );

        Ok(Self {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Open an existing store without write access.
    pub fn open_read_only<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open movie database {:?}", db_path))?;

        Ok(Self {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replace the content of all three tables.
    ///
    /// Existing rows are deleted and the new ones inserted within a single
    /// transaction, movies first. The AUTOINCREMENT counters of ratings and
    /// tags are reset so that identical inputs produce identical rows.
    pub fn replace_all(
        &mut self,
        movies: &[Movie],
        ratings: &[Rating],
        tags: &[Tag],
    ) -> Result<ReplaceCounts> {
        let tx = self.conn.transaction()?;

        // Children first, the movies rows may still be referenced.
        for table in [TAGS_TABLE_NAME, RATINGS_TABLE_NAME, MOVIES_TABLE_NAME] {
            let deleted = tx
                .execute(&format!("DELETE FROM {}", table), [])
                .with_context(|| format!("Failed to clear table {}", table))?;
            debug!("Cleared {} rows from {}", deleted, table);
        }
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name IN (?1, ?2)",
            params![RATINGS_TABLE_NAME, TAGS_TABLE_NAME],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO movies (movie_id, title, genres, release_year) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for movie in movies {
                stmt.execute(params![
                    movie.movie_id,
                    movie.title,
                    movie.genres,
                    movie.release_year
                ])
                .with_context(|| format!("Failed to insert movie {}", movie.movie_id))?;
            }
        }
        info!("Inserted {} movies", movies.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO ratings (user_id, movie_id, rating, timestamp) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for rating in ratings {
                stmt.execute(params![
                    rating.user_id,
                    rating.movie_id,
                    rating.rating,
                    rating.timestamp
                ])
                .with_context(|| {
                    format!(
                        "Failed to insert rating {} of user {} for movie {}",
                        rating.rating, rating.user_id, rating.movie_id
                    )
                })?;
            }
        }
        info!("Inserted {} ratings", ratings.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tags (user_id, movie_id, tag, timestamp) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for tag in tags {
                stmt.execute(params![tag.user_id, tag.movie_id, tag.tag, tag.timestamp])
                    .with_context(|| {
                        format!(
                            "Failed to insert tag {:?} of user {} for movie {}",
                            tag.tag, tag.user_id, tag.movie_id
                        )
                    })?;
            }
        }
        info!("Inserted {} tags", tags.len());

        tx.commit().context("Failed to commit catalog replace")?;

        Ok(ReplaceCounts {
            movies: movies.len(),
            ratings: ratings.len(),
            tags: tags.len(),
        })
    }

    /// Create the lookup indices on ratings and tags, if absent.
    pub fn create_indices(&self) -> Result<()> {
        MOVIE_CATALOG_SCHEMA.create_indices(&self.conn)
    }

    pub fn missing_indices(&self) -> Result<Vec<&'static str>> {
        MOVIE_CATALOG_SCHEMA.missing_indices(&self.conn)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |r| r.get(0))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            movies: count("SELECT COUNT(*) FROM movies")?,
            ratings: count("SELECT COUNT(*) FROM ratings")?,
            tags: count("SELECT COUNT(*) FROM tags")?,
            unique_users: count("SELECT COUNT(DISTINCT user_id) FROM ratings")?,
            average_rating: self
                .conn
                .query_row("SELECT AVG(rating) FROM ratings", [], |r| r.get(0))?,
            movies_with_release_year: count("SELECT COUNT(*) FROM movies WHERE release_year > 0")?,
        })
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        let db_path = self.db_path;
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .with_context(|| format!("Failed to close movie database {:?}", db_path))?;
        debug!("Closed movie database {:?}", db_path);
        Ok(())
    }
}
