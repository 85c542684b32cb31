use crate::cmdb::api;
use crate::error::SourceError;
use crate::http::create_client;
use crate::traits::RatingsBackend;
use async_trait::async_trait;
use cineast_config::ApiConfig;
use cineast_models::{MovieRatings, RatingSummary, ReviewRecord, ReviewSubmission, Score, ToplistQuery};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct CmdbClient {
    client: Arc<Client>,
    base_url: String,
    app_name: String,
    secret: Option<String>,
}

impl CmdbClient {
    pub fn new(base_url: String, app_name: String, timeout: Duration) -> Self {
        Self {
            client: Arc::new(create_client(timeout)),
            base_url,
            app_name,
            secret: None,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.cmdb_url.clone(),
            config.app_name.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_secret(mut self, secret: String) -> Self {
        self.secret = Some(secret);
        self
    }

    fn secret(&self) -> Result<&str, SourceError> {
        self.secret
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured("key service secret is not set; run `cineast config secret`".to_string()))
    }
}

#[async_trait]
impl RatingsBackend for CmdbClient {
    async fn api_key(&self) -> Result<String, SourceError> {
        let key = api::get_api_key(&self.client, &self.base_url, &self.app_name, self.secret()?).await?;
        info!("Obtained metadata API key from {}", self.source_name());
        Ok(key)
    }

    async fn all_movies(&self) -> Result<Vec<RatingSummary>, SourceError> {
        api::get_all_movies(&self.client, &self.base_url).await
    }

    async fn movie(&self, movie_id: &str) -> Result<MovieRatings, SourceError> {
        api::get_movie(&self.client, &self.base_url, movie_id).await
    }

    async fn toplist(&self, query: &ToplistQuery) -> Result<Vec<RatingSummary>, SourceError> {
        api::get_toplist(&self.client, &self.base_url, query).await
    }

    async fn latest_review(&self) -> Result<ReviewRecord, SourceError> {
        api::get_latest_review(&self.client, &self.base_url).await
    }

    async fn rate(&self, movie_id: &str, score: Score) -> Result<(), SourceError> {
        api::put_rating(&self.client, &self.base_url, movie_id, score).await?;
        info!("Rated {} with {}", movie_id, score);
        Ok(())
    }

    async fn post_review(&self, review: &ReviewSubmission) -> Result<(), SourceError> {
        api::post_review(&self.client, &self.base_url, review).await?;
        info!("Review for {} saved", review.movie_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_key_requires_secret() {
        let client = CmdbClient::new("http://localhost:9".to_string(), "app".to_string(), Duration::from_secs(1));
        let err = client.api_key().await.unwrap_err();
        assert!(matches!(err, SourceError::NotConfigured(_)));
    }
}
