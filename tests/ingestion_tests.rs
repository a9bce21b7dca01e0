//! End-to-end tests of the ingestion pipeline
//!
//! Tests write CSV inputs into a temporary data directory, run the pipeline
//! and inspect the resulting SQLite database directly.

mod common;

use common::*;
use movie_catalog::ingestion::IngestionError;
use movie_catalog::MovieStore;
use rusqlite::Connection;

fn all_ratings(data: &TestDataDir) -> Vec<(i64, i64, i64, f64, i64)> {
    let conn = Connection::open(data.db_path()).unwrap();
    let mut stmt = conn
        .prepare("SELECT rating_id, user_id, movie_id, rating, timestamp FROM ratings ORDER BY rating_id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

fn all_movies(data: &TestDataDir) -> Vec<(i64, String, String, i64)> {
    let conn = Connection::open(data.db_path()).unwrap();
    let mut stmt = conn
        .prepare("SELECT movie_id, title, genres, release_year FROM movies ORDER BY movie_id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

fn all_tags(data: &TestDataDir) -> Vec<(i64, i64, i64, String, i64)> {
    let conn = Connection::open(data.db_path()).unwrap();
    let mut stmt = conn
        .prepare("SELECT tag_id, user_id, movie_id, tag, timestamp FROM tags ORDER BY tag_id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

fn movie_row(data: &TestDataDir, movie_id: i64) -> (String, String, i64) {
    let conn = Connection::open(data.db_path()).unwrap();
    conn.query_row(
        "SELECT title, genres, release_year FROM movies WHERE movie_id = ?1",
        [movie_id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .unwrap()
}

#[test]
fn test_load_sample_inputs() {
    let data = TestDataDir::with_sample_inputs();

    let summary = data.load(true).unwrap();

    assert_eq!(summary.written.movies, SAMPLE_MOVIE_COUNT);
    assert_eq!(summary.written.ratings, SAMPLE_RATING_COUNT);
    assert_eq!(summary.written.tags, SAMPLE_TAG_COUNT);
    assert_eq!(summary.stats.movies, SAMPLE_MOVIE_COUNT);
    assert_eq!(summary.stats.ratings, SAMPLE_RATING_COUNT);
    assert_eq!(summary.stats.tags, SAMPLE_TAG_COUNT);
    assert_eq!(summary.stats.unique_users, 3);
    assert_eq!(summary.stats.movies_with_release_year, 4);
    assert_eq!(summary.movies_without_year, 1);
    assert_eq!(summary.skipped_movies, 0);
    assert!(!summary.validation.has_issues());
    assert_eq!(summary.validation.rating_range, Some((0.5, 5.0)));
    assert!(summary.missing_indices.is_empty());

    let average = summary.stats.average_rating.unwrap();
    assert!((average - 3.4375).abs() < 1e-9);
}

#[test]
fn test_titles_keep_year_and_genres_are_normalized() {
    let data = TestDataDir::with_sample_inputs();
    data.load(true).unwrap();

    assert_eq!(
        movie_row(&data, 1),
        (
            "Toy Story (1995)".to_string(),
            "Adventure|Animation|Children|Comedy|Fantasy".to_string(),
            1995
        )
    );
    assert_eq!(
        movie_row(&data, 4),
        ("Unknown Film".to_string(), String::new(), 0)
    );
    assert_eq!(movie_row(&data, 5).0, "American President, The (1995)");

    let conn = Connection::open(data.db_path()).unwrap();
    let tag: String = conn
        .query_row("SELECT tag FROM tags WHERE movie_id = 3", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tag, "heist, classic");
}

#[test]
fn test_reload_produces_identical_rows() {
    let data = TestDataDir::with_sample_inputs();

    data.load(true).unwrap();
    let first = (all_movies(&data), all_ratings(&data), all_tags(&data));
    data.load(true).unwrap();
    let second = (all_movies(&data), all_ratings(&data), all_tags(&data));

    assert_eq!(first.0.len(), SAMPLE_MOVIE_COUNT);
    assert_eq!(first.1.len(), SAMPLE_RATING_COUNT);
    assert_eq!(first.2.len(), SAMPLE_TAG_COUNT);
    assert_eq!(first, second);
    // Surrogate keys restart on every load
    assert_eq!(second.1.first().map(|r| r.0), Some(1));
    assert_eq!(
        second.2.iter().map(|t| t.0).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn test_reload_replaces_previous_content() {
    let data = TestDataDir::with_sample_inputs();
    data.load(true).unwrap();

    data.write_inputs(
        "movieId,title,genres\n10,Heat (1995),Action\n",
        &ratings_csv(&[(1, 10, 4.0, JAN_2000)]),
        TAGS_HEADER,
    );
    let summary = data.load(true).unwrap();

    assert_eq!(summary.stats.movies, 1);
    assert_eq!(summary.stats.ratings, 1);
    assert_eq!(summary.stats.tags, 0);
    assert_eq!(all_ratings(&data), vec![(1, 1, 10, 4.0, JAN_2000)]);
}

#[test]
fn test_out_of_range_rating_fails_and_keeps_previous_content() {
    let data = TestDataDir::with_sample_inputs();
    data.load(true).unwrap();

    let mut bad_ratings = SAMPLE_RATINGS_CSV.to_string();
    bad_ratings.push_str("3,2,5.5,953078400\n");
    data.write_inputs(SAMPLE_MOVIES_CSV, &bad_ratings, SAMPLE_TAGS_CSV);

    let result = data.load(true);
    assert!(matches!(result, Err(IngestionError::Persist(_))));

    // The failed replace is rolled back as a whole
    let store = MovieStore::open_read_only(data.db_path()).unwrap();
    let stats = store.stats().unwrap();
    assert_eq!(stats.movies, SAMPLE_MOVIE_COUNT);
    assert_eq!(stats.ratings, SAMPLE_RATING_COUNT);
    assert_eq!(stats.tags, SAMPLE_TAG_COUNT);
}

#[test]
fn test_orphan_rating_rejected_with_foreign_keys() {
    let data = TestDataDir::with_sample_inputs();
    let mut ratings = SAMPLE_RATINGS_CSV.to_string();
    ratings.push_str("1,99,3.0,946684800\n");
    data.write_inputs(SAMPLE_MOVIES_CSV, &ratings, SAMPLE_TAGS_CSV);

    let result = data.load(true);
    let err = result.unwrap_err();
    assert!(matches!(err, IngestionError::Persist(_)));
    assert!(err.to_string().contains("movie 99"));
}

#[test]
fn test_orphan_rating_accepted_without_foreign_keys() {
    let data = TestDataDir::with_sample_inputs();
    let mut ratings = SAMPLE_RATINGS_CSV.to_string();
    ratings.push_str("1,99,3.0,946684800\n");
    data.write_inputs(SAMPLE_MOVIES_CSV, &ratings, SAMPLE_TAGS_CSV);

    let summary = data.load(false).unwrap();
    assert_eq!(summary.stats.ratings, SAMPLE_RATING_COUNT + 1);
}

#[test]
fn test_duplicate_movie_id_fails() {
    let data = TestDataDir::with_sample_inputs();
    let mut movies = SAMPLE_MOVIES_CSV.to_string();
    movies.push_str("1,Toy Story Again (1995),Animation\n");
    data.write_inputs(&movies, SAMPLE_RATINGS_CSV, SAMPLE_TAGS_CSV);

    assert!(matches!(data.load(true), Err(IngestionError::Persist(_))));
}

#[test]
fn test_rows_without_id_or_title_are_skipped() {
    let data = TestDataDir::with_sample_inputs();
    let mut movies = SAMPLE_MOVIES_CSV.to_string();
    movies.push_str(",Nameless Id (2001),Drama\n");
    movies.push_str("7,,Drama\n");
    data.write_inputs(&movies, SAMPLE_RATINGS_CSV, SAMPLE_TAGS_CSV);

    let summary = data.load(true).unwrap();

    assert_eq!(summary.validation.null_movie_ids, 1);
    assert_eq!(summary.validation.null_titles, 1);
    assert!(summary.validation.has_issues());
    assert_eq!(summary.skipped_movies, 2);
    assert_eq!(summary.stats.movies, SAMPLE_MOVIE_COUNT);
}

#[test]
fn test_extra_columns_are_ignored() {
    let data = TestDataDir::new(
        "movieId,title,genres,imdbId\n1,Heat (1995),Action|Crime,0113277\n",
        "userId,movieId,rating,timestamp,device\n1,1,4.5,946684800,tv\n",
        "userId,movieId,tag,timestamp\n",
    );

    let summary = data.load(true).unwrap();
    assert_eq!(summary.stats.movies, 1);
    assert_eq!(summary.stats.ratings, 1);
    assert_eq!(summary.stats.tags, 0);
}

#[test]
fn test_missing_column_is_input_error() {
    let data = TestDataDir::new(
        SAMPLE_MOVIES_CSV,
        "userId,movieId,rating\n1,1,4.0\n",
        SAMPLE_TAGS_CSV,
    );

    let err = data.load(true).unwrap_err();
    assert!(matches!(err, IngestionError::Input(_)));
    assert!(err.to_string().contains("timestamp"));
}

#[test]
fn test_unparseable_rating_is_input_error() {
    let data = TestDataDir::new(
        SAMPLE_MOVIES_CSV,
        "userId,movieId,rating,timestamp\n1,1,great,946684800\n",
        SAMPLE_TAGS_CSV,
    );

    assert!(matches!(data.load(true), Err(IngestionError::Input(_))));
}

#[test]
fn test_missing_input_file_is_input_error() {
    let data = TestDataDir::with_sample_inputs();
    std::fs::remove_file(data.tags_path()).unwrap();

    assert!(matches!(data.load(true), Err(IngestionError::Input(_))));
}

#[test]
fn test_lookup_indices_exist_after_load() {
    let data = TestDataDir::with_sample_inputs();
    data.load(true).unwrap();

    let conn = Connection::open(data.db_path()).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name")
        .unwrap();
    let names: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(
        names,
        vec!["idx_ratings_movie", "idx_ratings_user", "idx_tags_movie"]
    );
}

#[test]
fn test_index_failure_is_only_a_warning() {
    let data = TestDataDir::with_sample_inputs();
    data.load(true).unwrap();
    {
        // A table taking the index name makes its creation fail
        let conn = Connection::open(data.db_path()).unwrap();
        conn.execute("DROP INDEX idx_tags_movie", []).unwrap();
        conn.execute("CREATE TABLE idx_tags_movie (id INTEGER)", [])
            .unwrap();
    }

    let summary = data.load(true).unwrap();

    assert_eq!(summary.missing_indices, vec!["idx_tags_movie"]);
    assert_eq!(summary.stats.movies, SAMPLE_MOVIE_COUNT);
    assert_eq!(summary.stats.ratings, SAMPLE_RATING_COUNT);
    assert_eq!(summary.stats.tags, SAMPLE_TAG_COUNT);
}

#[test]
fn test_empty_inputs_load_empty_store() {
    let data = TestDataDir::new(MOVIES_HEADER, RATINGS_HEADER, TAGS_HEADER);

    let summary = data.load(true).unwrap();
    assert_eq!(summary.stats.movies, 0);
    assert_eq!(summary.stats.ratings, 0);
    assert_eq!(summary.stats.average_rating, None);
    assert_eq!(summary.validation.rating_range, None);
}
