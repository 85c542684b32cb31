//! Rating and review submission.
//!
//! A movie moves from `Unrated` to `Rated(score)` once a rating or review is
//! accepted by the ratings backend. The reviewed flag is local to this client
//! and expires; while it is live every further submission for that movie is
//! refused before anything goes over the wire.

use crate::cancel::{guarded, Cancelled};
use chrono::{DateTime, Duration, Utc};
use cineast_config::FlagStore;
use cineast_models::{MovieRatings, ReviewSubmission, Score, ScoreError, MAX_REVIEW_CHARS};
use cineast_sources::{RatingsBackend, SourceError};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "score", rename_all = "snake_case")]
pub enum RatingState {
    Unrated,
    Rated(Score),
}

impl RatingState {
    pub fn of(flags: &FlagStore, movie_id: &str, now: DateTime<Utc>) -> Self {
        match flags.reviewed(movie_id, now) {
            Some(flag) => RatingState::Rated(flag.score),
            None => RatingState::Unrated,
        }
    }

    pub fn is_rated(&self) -> bool {
        matches!(self, RatingState::Rated(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a reviewer name is required")]
    MissingName,
    #[error("review text is required")]
    MissingText,
    #[error("review text is {len} characters, the limit is {max}")]
    TextTooLong { len: usize, max: usize },
    #[error("a score is required")]
    MissingScore,
    #[error(transparent)]
    InvalidScore(#[from] ScoreError),
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{movie_id} was already rated from this client (locked until {until})")]
    StateConflict { movie_id: String, until: DateTime<Utc> },

    #[error("submission failed: {0}")]
    Network(#[from] SourceError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// A review as typed by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct ReviewDraft {
    pub movie_id: String,
    pub reviewer: String,
    pub score: Option<u8>,
    pub text: String,
}

impl ReviewDraft {
    pub fn new(movie_id: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            ..Self::default()
        }
    }

    /// Checks run in form order: name, text, then score.
    /// Surrounding whitespace is trimmed before the length check.
    pub fn validate(&self) -> Result<ReviewSubmission, ValidationError> {
        let reviewer = self.reviewer.trim();
        if reviewer.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingText);
        }
        let len = text.chars().count();
        if len > MAX_REVIEW_CHARS {
            return Err(ValidationError::TextTooLong { len, max: MAX_REVIEW_CHARS });
        }
        let score = Score::new(self.score.ok_or(ValidationError::MissingScore)?)?;

        Ok(ReviewSubmission {
            movie_id: self.movie_id.clone(),
            reviewer: reviewer.to_string(),
            score,
            review: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingReceipt {
    pub movie_id: String,
    pub state: RatingState,
    /// Ratings as re-read after the submission; absent if that read failed
    pub refreshed: Option<MovieRatings>,
}

pub type ReviewReceipt = RatingReceipt;

/// Refuse a movie whose reviewed flag is still live
pub fn ensure_unrated(flags: &FlagStore, movie_id: &str, now: DateTime<Utc>) -> Result<(), FlowError> {
    match flags.reviewed(movie_id, now) {
        Some(flag) => Err(FlowError::StateConflict {
            movie_id: movie_id.to_string(),
            until: flag.expires_at,
        }),
        None => Ok(()),
    }
}

async fn refresh(ratings: &dyn RatingsBackend, movie_id: &str, cancel: &CancellationToken) -> Option<MovieRatings> {
    match guarded(cancel, ratings.movie(movie_id)).await {
        Ok(Ok(fresh)) => Some(fresh),
        Ok(Err(e)) => {
            warn!("Could not refresh ratings for {} after submission: {}", movie_id, e);
            None
        }
        Err(Cancelled) => None,
    }
}

/// Submit an anonymous score. The flag is only set once the backend accepts it.
pub async fn submit_rating(
    ratings: &dyn RatingsBackend,
    flags: &mut FlagStore,
    movie_id: &str,
    score: Score,
    ttl: Duration,
    cancel: &CancellationToken,
) -> Result<RatingReceipt, FlowError> {
    ensure_unrated(flags, movie_id, Utc::now())?;

    info!("Rating {} with {}", movie_id, score);
    guarded(cancel, ratings.rate(movie_id, score)).await??;
    flags.mark_reviewed(movie_id, score, Utc::now(), ttl);

    Ok(RatingReceipt {
        movie_id: movie_id.to_string(),
        state: RatingState::Rated(score),
        refreshed: refresh(ratings, movie_id, cancel).await,
    })
}

/// Validate and post a written review, then flag the movie.
pub async fn submit_review(
    ratings: &dyn RatingsBackend,
    flags: &mut FlagStore,
    draft: &ReviewDraft,
    ttl: Duration,
    cancel: &CancellationToken,
) -> Result<ReviewReceipt, FlowError> {
    ensure_unrated(flags, &draft.movie_id, Utc::now())?;
    let submission = draft.validate()?;

    info!("Posting review of {} by {}", submission.movie_id, submission.reviewer);
    guarded(cancel, ratings.post_review(&submission)).await??;
    flags.mark_reviewed(&submission.movie_id, submission.score, Utc::now(), ttl);

    Ok(ReviewReceipt {
        movie_id: submission.movie_id.clone(),
        state: RatingState::Rated(submission.score),
        refreshed: refresh(ratings, &submission.movie_id, cancel).await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRatings;
    use std::path::PathBuf;

    fn flags() -> FlagStore {
        FlagStore::new(PathBuf::from("/tmp/cineast-submission-test-flags.toml"))
    }

    fn score(value: u8) -> Score {
        Score::new(value).unwrap()
    }

    fn draft(name: &str, text: &str, score: Option<u8>) -> ReviewDraft {
        ReviewDraft {
            movie_id: "tt1".to_string(),
            reviewer: name.to_string(),
            score,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_draft_validation_order() {
        assert_eq!(draft("", "", None).validate(), Err(ValidationError::MissingName));
        assert_eq!(draft("Ada", "  ", None).validate(), Err(ValidationError::MissingText));
        assert_eq!(draft("Ada", "Fine", None).validate(), Err(ValidationError::MissingScore));
        assert!(matches!(
            draft("Ada", "Fine", Some(5)).validate(),
            Err(ValidationError::InvalidScore(_))
        ));

        let ok = draft(" Ada ", "Fine film", Some(3)).validate().unwrap();
        assert_eq!(ok.reviewer, "Ada");
        assert_eq!(ok.score, score(3));
    }

    #[test]
    fn test_draft_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_REVIEW_CHARS);
        assert!(draft("Ada", &at_limit, Some(2)).validate().is_ok());

        let over = "x".repeat(MAX_REVIEW_CHARS + 1);
        assert_eq!(
            draft("Ada", &over, Some(2)).validate(),
            Err(ValidationError::TextTooLong { len: 151, max: 150 })
        );
    }

    #[tokio::test]
    async fn test_rating_flagged_movie_makes_no_network_call() {
        let backend = MockRatings::new();
        let mut flags = flags();
        flags.mark_reviewed("tt1", score(2), Utc::now(), Duration::hours(24));

        let result = submit_rating(&backend, &mut flags, "tt1", score(4), Duration::hours(24), &CancellationToken::new()).await;

        assert!(matches!(result, Err(FlowError::StateConflict { .. })));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_rating_sets_flag() {
        let backend = MockRatings::new().with_movie("tt1", Some(3.0), 2);
        let mut flags = flags();

        let receipt = submit_rating(&backend, &mut flags, "tt1", score(4), Duration::hours(24), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(receipt.state, RatingState::Rated(score(4)));
        assert!(receipt.refreshed.is_some());
        assert_eq!(backend.rated(), vec![("tt1".to_string(), score(4))]);
        assert_eq!(RatingState::of(&flags, "tt1", Utc::now()), RatingState::Rated(score(4)));
    }

    #[tokio::test]
    async fn test_failed_rating_stays_unrated() {
        let backend = MockRatings::new().failing_writes();
        let mut flags = flags();

        let result = submit_rating(&backend, &mut flags, "tt1", score(1), Duration::hours(24), &CancellationToken::new()).await;

        assert!(matches!(result, Err(FlowError::Network(_))));
        assert_eq!(RatingState::of(&flags, "tt1", Utc::now()), RatingState::Unrated);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_review_is_not_posted() {
        let backend = MockRatings::new();
        let mut flags = flags();

        let result = submit_review(&backend, &mut flags, &draft("Ada", "", Some(3)), Duration::hours(24), &CancellationToken::new()).await;

        assert!(matches!(result, Err(FlowError::Validation(ValidationError::MissingText))));
        assert_eq!(backend.calls(), 0);
        assert!(!flags.is_reviewed("tt1", Utc::now()));
    }

    #[tokio::test]
    async fn test_review_posts_then_flags_and_refreshes() {
        let backend = MockRatings::new().with_movie("tt1", Some(2.5), 4);
        let mut flags = flags();

        let receipt = submit_review(&backend, &mut flags, &draft("Ada", "Loved it", Some(4)), Duration::hours(24), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.posted().len(), 1);
        assert_eq!(backend.posted()[0].review, "Loved it");
        assert_eq!(receipt.refreshed.map(|r| r.summary.count), Some(4));
        assert!(flags.is_reviewed("tt1", Utc::now()));

        let again = submit_review(&backend, &mut flags, &draft("Ada", "Twice", Some(1)), Duration::hours(24), &CancellationToken::new()).await;
        assert!(matches!(again, Err(FlowError::StateConflict { .. })));
        assert_eq!(backend.posted().len(), 1);
    }
}
