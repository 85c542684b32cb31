use crate::error::SourceError;
use crate::http::{ensure_success, join_url, read_json};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use cineast_models::{CategorizedScore, MovieRatings, RatingSummary, ReviewRecord, ReviewSubmission, Score, ToplistQuery};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct CmdbCategorizedScore {
    score: u8,
    #[serde(default)]
    count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CmdbReview {
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    reviewer: Option<String>,
    score: Option<i64>,
    review: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CmdbMovie {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "cmdbScore")]
    cmdb_score: Option<f64>,
    #[serde(default)]
    count: Option<u32>,
    #[serde(rename = "topScore", default)]
    top_score: Option<f64>,
    #[serde(rename = "minScore", default)]
    min_score: Option<f64>,
    #[serde(rename = "categorizedScores", default)]
    categorized_scores: Option<Vec<CmdbCategorizedScore>>,
    #[serde(default)]
    reviews: Option<Vec<CmdbReview>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CmdbToplistResponse {
    #[serde(default)]
    movies: Vec<CmdbMovie>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CmdbKeyResponse {
    #[serde(rename = "apiKey")]
    api_key: String,
}

/// Accepts RFC 3339, naive date-times and plain dates
pub(crate) fn parse_review_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl CmdbMovie {
    fn to_summary(&self) -> RatingSummary {
        RatingSummary {
            movie_id: self.imdb_id.clone(),
            score: self.cmdb_score,
            count: self.count.unwrap_or(0),
            top_score: self.top_score,
            min_score: self.min_score,
            categorized: self
                .categorized_scores
                .as_ref()
                .map(|scores| {
                    scores
                        .iter()
                        .map(|s| CategorizedScore { score: s.score, count: s.count })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl CmdbReview {
    /// Anonymous ratings come back as reviews without reviewer or text; those are skipped
    fn into_record(self, fallback_movie_id: &str) -> Option<ReviewRecord> {
        let author = self.reviewer?;
        let text = self.review?;
        let score = match self.score.map(Score::try_from) {
            Some(Ok(score)) => score,
            Some(Err(e)) => {
                debug!("Skipping review by {} with invalid score: {}", author, e);
                return None;
            }
            None => {
                debug!("Skipping review by {} without score", author);
                return None;
            }
        };
        Some(ReviewRecord {
            movie_id: self.imdb_id.unwrap_or_else(|| fallback_movie_id.to_string()),
            author,
            score,
            text,
            date: self.date.as_deref().and_then(parse_review_date),
        })
    }
}

/// `GET /keys/{app}/{secret}`
pub async fn get_api_key(client: &Client, base: &str, app: &str, secret: &str) -> Result<String, SourceError> {
    let path = format!("keys/{}/{}", urlencoding::encode(app), urlencoding::encode(secret));
    let url = join_url(base, &path);
    debug!("Fetching metadata API key for app {}", app);

    let response = client.get(&url).send().await?;
    let key: CmdbKeyResponse = read_json(response, "keys").await?;
    Ok(key.api_key)
}

/// `GET /movies/`
pub async fn get_all_movies(client: &Client, base: &str) -> Result<Vec<RatingSummary>, SourceError> {
    let url = join_url(base, "movies/");
    debug!("GET {}", url);

    let response = client.get(&url).send().await?;
    let movies: Vec<CmdbMovie> = read_json(response, "movies").await?;
    Ok(movies.iter().map(CmdbMovie::to_summary).collect())
}

/// `GET /movies/{id}`
pub async fn get_movie(client: &Client, base: &str, movie_id: &str) -> Result<MovieRatings, SourceError> {
    let url = join_url(base, &format!("movies/{}", urlencoding::encode(movie_id)));
    debug!("GET {}", url);

    let response = client.get(&url).send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(movie_id.to_string()));
    }
    let movie: CmdbMovie = read_json(response, "movies/{id}").await?;
    Ok(movie_ratings_from(movie, movie_id))
}

fn movie_ratings_from(mut movie: CmdbMovie, requested_id: &str) -> MovieRatings {
    let summary = movie.to_summary();
    let reviews = movie
        .reviews
        .take()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| r.into_record(requested_id))
        .collect();
    MovieRatings { summary, reviews }
}

/// `GET /toplists?sort&limit&page&countLimit`
pub async fn get_toplist(client: &Client, base: &str, query: &ToplistQuery) -> Result<Vec<RatingSummary>, SourceError> {
    let url = join_url(base, "toplists");
    debug!("GET {} {:?}", url, query);

    let response = client.get(&url).query(&query.to_query_pairs()).send().await?;
    let toplist: CmdbToplistResponse = read_json(response, "toplists").await?;
    Ok(toplist.movies.iter().map(CmdbMovie::to_summary).collect())
}

/// `GET /movies/latest/`
pub async fn get_latest_review(client: &Client, base: &str) -> Result<ReviewRecord, SourceError> {
    let url = join_url(base, "movies/latest/");
    debug!("GET {}", url);

    let response = client.get(&url).send().await?;
    let review: CmdbReview = read_json(response, "movies/latest").await?;
    review.into_record("").ok_or_else(|| SourceError::Parse {
        endpoint: "movies/latest".to_string(),
        message: "latest review is missing reviewer, text or a valid score".to_string(),
    })
}

/// `PUT /movies/rate/{id}/{score}`
pub async fn put_rating(client: &Client, base: &str, movie_id: &str, score: Score) -> Result<(), SourceError> {
    let url = join_url(base, &format!("movies/rate/{}/{}", urlencoding::encode(movie_id), score));
    debug!("PUT {}", url);

    let response = client.put(&url).send().await?;
    ensure_success(response, "movies/rate").await?;
    Ok(())
}

/// `POST /movies/review`
pub async fn post_review(client: &Client, base: &str, review: &ReviewSubmission) -> Result<(), SourceError> {
    let url = join_url(base, "movies/review");
    debug!("POST {} for {}", url, review.movie_id);

    let response = client.post(&url).json(review).send().await?;
    ensure_success(response, "movies/review").await?;
    Ok(())
}
