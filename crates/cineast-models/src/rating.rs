use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A user score on the community scale, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("score must be between {} and {}, got {0}", Score::MIN, Score::MAX)]
pub struct ScoreError(pub i64);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreError(value as i64))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Every valid score, lowest first
    pub fn all() -> impl Iterator<Item = Score> {
        (Self::MIN..=Self::MAX).map(Score)
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ScoreError(value))
            .and_then(Score::new)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorizedScore {
    pub score: u8,
    pub count: u32,
}

/// Aggregated community rating for one movie, as held by the ratings backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub movie_id: String,
    pub score: Option<f64>,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub categorized: Vec<CategorizedScore>,
}

impl RatingSummary {
    pub fn new(movie_id: impl Into<String>, score: Option<f64>, count: u32) -> Self {
        Self {
            movie_id: movie_id.into(),
            score,
            count,
            top_score: None,
            min_score: None,
            categorized: Vec::new(),
        }
    }

    /// Vote count per score 1..=4; scores nobody picked report zero.
    pub fn distribution(&self) -> Vec<(Score, u32)> {
        Score::all()
            .map(|score| {
                let count = self
                    .categorized
                    .iter()
                    .find(|c| c.score == score.value())
                    .map(|c| c.count)
                    .unwrap_or(0);
                (score, count)
            })
            .collect()
    }
}

/// Everything the ratings backend knows about one movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRatings {
    pub summary: RatingSummary,
    pub reviews: Vec<crate::review::ReviewRecord>,
}

impl MovieRatings {
    /// Nothing on record for this movie
    pub fn empty(movie_id: impl Into<String>) -> Self {
        Self {
            summary: RatingSummary::new(movie_id, None, 0),
            reviews: Vec::new(),
        }
    }
}
