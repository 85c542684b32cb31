use crate::error::SourceError;
use crate::http::create_client;
use crate::omdb::api;
use crate::traits::MetadataBackend;
use async_trait::async_trait;
use cineast_config::ApiConfig;
use cineast_models::{MovieDetails, MovieRecord};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
}

impl OmdbClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            client: Arc::new(create_client(timeout)),
            base_url,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.omdb_url.clone(), Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl MetadataBackend for OmdbClient {
    async fn movie(&self, api_key: &str, movie_id: &str, full_plot: bool) -> Result<MovieDetails, SourceError> {
        api::get_movie(&self.client, &self.base_url, api_key, movie_id, full_plot).await
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<MovieRecord>, SourceError> {
        api::search_movies(&self.client, &self.base_url, api_key, query).await
    }
}
