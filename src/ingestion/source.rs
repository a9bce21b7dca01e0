//! Reading of the raw CSV inputs.
//!
//! Each input is a header-bearing, comma-delimited file. The header row is
//! rewritten to the canonical column names before rows are deserialized, so
//! the row types below only ever see `movie_id` / `user_id`. Columns without
//! a matching field are dropped by deserialization.

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Source column name -> canonical column name.
pub type ColumnRenames = &'static [(&'static str, &'static str)];

/// Description of one raw input table.
pub struct SourceTable {
    pub name: &'static str,
    pub renames: ColumnRenames,
    /// Canonical columns that must be present after renaming.
    pub required_columns: &'static [&'static str],
}

pub const MOVIES_SOURCE: SourceTable = SourceTable {
    name: "movies",
    renames: &[("movieId", "movie_id")],
    required_columns: &["movie_id", "title", "genres"],
};

pub const RATINGS_SOURCE: SourceTable = SourceTable {
    name: "ratings",
    renames: &[("userId", "user_id"), ("movieId", "movie_id")],
    required_columns: &["user_id", "movie_id", "rating", "timestamp"],
};

pub const TAGS_SOURCE: SourceTable = SourceTable {
    name: "tags",
    renames: &[("userId", "user_id"), ("movieId", "movie_id")],
    required_columns: &["user_id", "movie_id", "tag", "timestamp"],
};

/// A raw movies row. Unparseable or empty ids and titles are kept as `None`
/// so that validation can count them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieRow {
    #[serde(deserialize_with = "csv::invalid_option")]
    pub movie_id: Option<i64>,
    pub title: Option<String>,
    pub genres: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRow {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagRow {
    pub user_id: i64,
    pub movie_id: i64,
    pub tag: String,
    pub timestamp: i64,
}

impl SourceTable {
    fn canonical_name<'a>(&self, column: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(source, _)| *source == column)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(column)
    }

    /// Header row with every source name replaced by its canonical name.
    pub fn rename_headers(&self, headers: &StringRecord) -> Result<StringRecord> {
        let renamed: StringRecord = headers
            .iter()
            .map(|column| self.canonical_name(column.trim()))
            .collect();

        for required in self.required_columns {
            if !renamed.iter().any(|column| column == *required) {
                bail!(
                    "Input table {} is missing column {} (found: {})",
                    self.name,
                    required,
                    renamed.iter().collect::<Vec<_>>().join(", ")
                );
            }
        }
        Ok(renamed)
    }

    /// Deserialize all rows of a CSV document into `T`.
    pub fn read_rows<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<Vec<T>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read {} header row", self.name))?
            .clone();
        reader.set_headers(self.rename_headers(&headers)?);

        let mut rows = Vec::new();
        for (index, result) in reader.deserialize().enumerate() {
            // +2: 1-based, after the header row
            let row = result
                .with_context(|| format!("Invalid {} row at line {}", self.name, index + 2))?;
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn read_file<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {} input {:?}", self.name, path))?;
        self.read_rows(std::io::BufReader::new(file))
    }
}
