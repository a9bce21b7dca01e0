//! Field derivation from raw movie rows.
//!
//! MovieLens titles carry the release year as a trailing annotation, as in
//! `Toy Story (1995)`. The year is recovered with a suffix scan only: a title
//! whose last four characters before the final `)` are not all digits has no
//! derivable year.

/// Placeholder used by the source data for movies without genres.
pub const NO_GENRES_PLACEHOLDER: &str = "(no genres listed)";

/// Separator between genre labels in the `genres` column.
pub const GENRE_SEPARATOR: char = '|';

/// Extract the release year from the trailing `(YYYY)` of a title.
pub fn extract_year(title: &str) -> Option<i64> {
    if !title.ends_with(')') || !title.contains('(') {
        return None;
    }
    let chars: Vec<char> = title.chars().collect();
    let end = chars.len() - 1;
    let start = end.saturating_sub(4);
    let year = &chars[start..end];
    if year.len() == 4 && year.iter().all(|c| c.is_ascii_digit()) {
        year.iter().collect::<String>().parse().ok()
    } else {
        None
    }
}

/// Title without its last parenthesised part, e.g. `Toy Story (1995)` -> `Toy Story`.
pub fn clean_title(title: &str) -> &str {
    match title.rfind('(') {
        Some(index) => title[..index].trim(),
        None => title,
    }
}

/// Normalize the raw genres field for persistence.
///
/// The placeholder and a missing field both become the empty string.
pub fn normalize_genres(raw: Option<&str>) -> String {
    match raw {
        Some(NO_GENRES_PLACEHOLDER) | None => String::new(),
        Some(genres) => genres.to_string(),
    }
}

/// Split a `|` separated genres field into trimmed, non-empty labels.
pub fn split_genres(genres: &str) -> impl Iterator<Item = &str> {
    genres
        .split(GENRE_SEPARATOR)
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
}
