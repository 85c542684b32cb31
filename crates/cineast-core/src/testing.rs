// In-memory backends for flow tests

use async_trait::async_trait;
use cineast_models::{
    MovieDetails, MovieRatings, MovieRecord, RatingSummary, ReviewRecord, ReviewSubmission, Score, SortOrder, ToplistQuery,
};
use cineast_sources::{MetadataBackend, RatingsBackend, SourceError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn unavailable(endpoint: &str) -> SourceError {
    SourceError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[derive(Default)]
pub struct MockRatings {
    movies: Vec<MovieRatings>,
    latest: Option<ReviewRecord>,
    latest_delay: Option<Duration>,
    no_key: bool,
    fail_reads: bool,
    fail_writes: bool,
    calls: AtomicUsize,
    rated: Mutex<Vec<(String, Score)>>,
    posted: Mutex<Vec<ReviewSubmission>>,
}

impl MockRatings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movie(mut self, movie_id: &str, score: Option<f64>, count: u32) -> Self {
        self.movies.push(MovieRatings {
            summary: RatingSummary::new(movie_id, score, count),
            reviews: Vec::new(),
        });
        self
    }

    /// Attach a review to a movie added with `with_movie`
    pub fn with_review(mut self, review: ReviewRecord) -> Self {
        if let Some(movie) = self.movies.iter_mut().find(|m| m.summary.movie_id == review.movie_id) {
            movie.reviews.push(review);
        }
        self
    }

    pub fn with_latest(mut self, review: ReviewRecord) -> Self {
        self.latest = Some(review);
        self
    }

    pub fn with_latest_delay(mut self, delay: Duration) -> Self {
        self.latest_delay = Some(delay);
        self
    }

    pub fn without_key(mut self) -> Self {
        self.no_key = true;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rated(&self) -> Vec<(String, Score)> {
        self.rated.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<ReviewSubmission> {
        self.posted.lock().unwrap().clone()
    }

    fn read(&self, endpoint: &str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(unavailable(endpoint));
        }
        Ok(())
    }

    fn write(&self, endpoint: &str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(unavailable(endpoint));
        }
        Ok(())
    }
}

#[async_trait]
impl RatingsBackend for MockRatings {
    async fn api_key(&self) -> Result<String, SourceError> {
        self.read("keys")?;
        if self.no_key {
            return Err(SourceError::NotConfigured("no secret".to_string()));
        }
        Ok("test-key".to_string())
    }

    async fn all_movies(&self) -> Result<Vec<RatingSummary>, SourceError> {
        self.read("movies")?;
        Ok(self.movies.iter().map(|m| m.summary.clone()).collect())
    }

    async fn movie(&self, movie_id: &str) -> Result<MovieRatings, SourceError> {
        self.read("movies/{id}")?;
        self.movies
            .iter()
            .find(|m| m.summary.movie_id == movie_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(movie_id.to_string()))
    }

    async fn toplist(&self, query: &ToplistQuery) -> Result<Vec<RatingSummary>, SourceError> {
        self.read("toplists")?;
        let mut summaries: Vec<RatingSummary> = self
            .movies
            .iter()
            .map(|m| m.summary.clone())
            .filter(|s| s.count >= query.count_limit)
            .collect();
        summaries.sort_by(|a, b| {
            let (a, b) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
            match query.sort {
                SortOrder::Desc => b.total_cmp(&a),
                SortOrder::Asc => a.total_cmp(&b),
            }
        });
        let skip = (query.page.saturating_sub(1) * query.limit) as usize;
        Ok(summaries.into_iter().skip(skip).take(query.limit as usize).collect())
    }

    async fn latest_review(&self) -> Result<ReviewRecord, SourceError> {
        self.read("movies/latest")?;
        if let Some(delay) = self.latest_delay {
            tokio::time::sleep(delay).await;
        }
        self.latest
            .clone()
            .ok_or_else(|| SourceError::NotFound("latest".to_string()))
    }

    async fn rate(&self, movie_id: &str, score: Score) -> Result<(), SourceError> {
        self.write("movies/rate")?;
        self.rated.lock().unwrap().push((movie_id.to_string(), score));
        Ok(())
    }

    async fn post_review(&self, review: &ReviewSubmission) -> Result<(), SourceError> {
        self.write("movies/review")?;
        self.posted.lock().unwrap().push(review.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockMetadata {
    movies: Vec<MovieDetails>,
    broken: HashSet<String>,
    fail_search: bool,
    calls: AtomicUsize,
}

pub fn details(record: MovieRecord, plot: &str) -> MovieDetails {
    MovieDetails {
        record,
        released: None,
        plot: Some(plot.to_string()),
        director: None,
        actors: None,
        imdb_rating: None,
    }
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, record: MovieRecord) -> Self {
        let plot = format!("Plot of {}", record.title);
        self.movies.push(details(record, &plot));
        self
    }

    /// Lookups of this id fail; searches still list it
    pub fn broken(mut self, movie_id: &str) -> Self {
        self.broken.insert(movie_id.to_string());
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataBackend for MockMetadata {
    async fn movie(&self, api_key: &str, movie_id: &str, full_plot: bool) -> Result<MovieDetails, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(api_key, "test-key");
        if self.broken.contains(movie_id) {
            return Err(unavailable("omdb ?i"));
        }
        let mut found = self
            .movies
            .iter()
            .find(|m| m.record.id == movie_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(movie_id.to_string()))?;
        if full_plot {
            found.plot = found.plot.map(|p| format!("{} (full)", p));
        }
        Ok(found)
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<MovieRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(api_key, "test-key");
        if self.fail_search {
            return Err(unavailable("omdb ?s"));
        }
        let query = query.to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|m| m.record.title.to_lowercase().contains(&query))
            .map(|m| MovieRecord {
                id: m.record.id.clone(),
                title: m.record.title.clone(),
                year: m.record.year,
                ..MovieRecord::new("", "")
            })
            .collect())
    }
}
