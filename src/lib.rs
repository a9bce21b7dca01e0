//! Movie Catalog Library
//!
//! Loads MovieLens style CSV exports into a SQLite store and derives the
//! analytics reports from it. The modules are exposed for the binary and
//! for testing.

pub mod catalog_store;
pub mod config;
pub mod ingestion;
pub mod reports;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_store::MovieStore;
pub use config::AppConfig;
pub use ingestion::{IngestionError, IngestionPipeline, IngestionSettings};
pub use reports::{ReportGenerator, ReportKind, ReportSettings};
