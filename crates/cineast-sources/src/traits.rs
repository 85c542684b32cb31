use async_trait::async_trait;
use cineast_models::{MovieDetails, MovieRatings, MovieRecord, RatingSummary, ReviewRecord, ReviewSubmission, Score, ToplistQuery};
use crate::error::SourceError;

/// The first-party ratings backend ("cmdb"): community scores and reviews.
#[async_trait]
pub trait RatingsBackend: Send + Sync {
    fn source_name(&self) -> &str {
        "cmdb"
    }

    /// Fetch the key that unlocks the metadata backend
    async fn api_key(&self) -> Result<String, SourceError>;

    /// Every movie that has at least one rating
    async fn all_movies(&self) -> Result<Vec<RatingSummary>, SourceError>;

    /// Rating summary and reviews for one movie
    async fn movie(&self, movie_id: &str) -> Result<MovieRatings, SourceError>;

    async fn toplist(&self, query: &ToplistQuery) -> Result<Vec<RatingSummary>, SourceError>;

    async fn latest_review(&self) -> Result<ReviewRecord, SourceError>;

    async fn rate(&self, movie_id: &str, score: Score) -> Result<(), SourceError>;

    async fn post_review(&self, review: &ReviewSubmission) -> Result<(), SourceError>;
}

/// The third-party metadata backend ("omdb").
#[async_trait]
pub trait MetadataBackend: Send + Sync {
    fn source_name(&self) -> &str {
        "omdb"
    }

    /// Full metadata for one movie; `full_plot` asks for the long plot text
    async fn movie(&self, api_key: &str, movie_id: &str, full_plot: bool) -> Result<MovieDetails, SourceError>;

    /// Title search restricted to movies. Hits carry title, year and poster only.
    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<MovieRecord>, SourceError>;
}
