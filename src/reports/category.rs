use serde::Serialize;
use std::fmt;

/// Bucket of a movie's mean rating. Variants are declared best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RatingCategory {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
    Poor,
}

impl RatingCategory {
    pub fn from_average(avg_rating: f64) -> Self {
        if avg_rating >= 4.0 {
            RatingCategory::Excellent
        } else if avg_rating >= 3.5 {
            RatingCategory::Good
        } else if avg_rating >= 3.0 {
            RatingCategory::Average
        } else if avg_rating >= 2.5 {
            RatingCategory::BelowAverage
        } else {
            RatingCategory::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingCategory::Excellent => "Excellent",
            RatingCategory::Good => "Good",
            RatingCategory::Average => "Average",
            RatingCategory::BelowAverage => "Below Average",
            RatingCategory::Poor => "Poor",
        }
    }
}

impl fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
