#![allow(dead_code)]

pub const MOVIES_HEADER: &str = "movieId,title,genres";
pub const RATINGS_HEADER: &str = "userId,movieId,rating,timestamp";
pub const TAGS_HEADER: &str = "userId,movieId,tag,timestamp";

/// Five movies: four with a release year, one without genres or year.
pub const SAMPLE_MOVIES_CSV: &str = "movieId,title,genres
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
2,Jumanji (1995),Adventure|Children|Fantasy
3,Heat (1995),Action|Crime|Thriller
4,Unknown Film,(no genres listed)
5,\"American President, The (1995)\",Comedy|Drama|Romance
";

/// Eight ratings by three users, spread over January and February 2000.
pub const SAMPLE_RATINGS_CSV: &str = "userId,movieId,rating,timestamp
1,1,4.0,946684800
1,2,3.5,946684800
1,3,5.0,949363140
2,1,5.0,949363200
2,3,4.5,949363200
2,5,2.0,953078400
3,1,3.0,953078400
3,4,0.5,953078400
";

pub const SAMPLE_TAGS_CSV: &str = "userId,movieId,tag,timestamp
1,1,pixar,946684800
2,3,\"heist, classic\",949363200
3,5,politics,953078400
";

pub const SAMPLE_MOVIE_COUNT: usize = 5;
pub const SAMPLE_RATING_COUNT: usize = 8;
pub const SAMPLE_TAG_COUNT: usize = 3;

/// 2000-01-01T00:00:00Z
pub const JAN_2000: i64 = 946684800;
/// 2000-02-01T00:00:00Z
pub const FEB_2000: i64 = 949363200;
/// 2000-03-15T00:00:00Z
pub const MAR_2000: i64 = 953078400;
