pub mod movie;
pub mod rating;
pub mod review;
pub mod toplist;

pub use movie::{CombinedMovie, Enrichment, MovieDetails, MovieRecord};
pub use rating::{CategorizedScore, MovieRatings, RatingSummary, Score, ScoreError};
pub use review::{LatestReview, ReviewRecord, ReviewSubmission, MAX_REVIEW_CHARS};
pub use toplist::{SortOrder, ToplistQuery};
