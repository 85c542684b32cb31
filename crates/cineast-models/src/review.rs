use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::rating::Score;

/// Longest review text the ratings backend accepts
pub const MAX_REVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRecord {
    pub movie_id: String,
    pub author: String,
    pub score: Score,
    pub text: String,
    /// None when the backend sent a date we could not parse
    pub date: Option<DateTime<Utc>>,
}

/// The most recent review on the ratings backend, joined with its movie title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatestReview {
    pub review: ReviewRecord,
    pub title: Option<String>,
}

/// Body of `POST /movies/review`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewSubmission {
    #[serde(rename = "imdbID")]
    pub movie_id: String,
    pub reviewer: String,
    pub score: Score,
    pub review: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_wire_names() {
        let submission = ReviewSubmission {
            movie_id: "tt0111161".to_string(),
            reviewer: "Ada".to_string(),
            score: Score::new(4).unwrap(),
            review: "Hope is a good thing.".to_string(),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["imdbID"], "tt0111161");
        assert_eq!(json["reviewer"], "Ada");
        assert_eq!(json["score"], 4);
        assert_eq!(json["review"], "Hope is a good thing.");
    }
}
