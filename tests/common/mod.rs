//! Common test infrastructure
//!
//! Integration tests write their CSV inputs into a temporary data directory
//! and run the real pipeline and reports against it.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestDataDir;
//!
//! #[test]
//! fn test_load() {
//!     let data = TestDataDir::with_sample_inputs();
//!     let summary = data.load(true).unwrap();
//!     assert_eq!(summary.stats.movies, 5);
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{ratings_csv, repeated_ratings, TestDataDir};
