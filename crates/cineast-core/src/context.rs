use crate::autocomplete::TitleIndex;
use cineast_sources::{MetadataBackend, RatingsBackend, SourceError};
use std::sync::Arc;
use tracing::debug;

/// The two backends a flow talks to.
#[derive(Clone)]
pub struct Backends {
    pub ratings: Arc<dyn RatingsBackend>,
    pub metadata: Arc<dyn MetadataBackend>,
}

impl Backends {
    pub fn new(ratings: Arc<dyn RatingsBackend>, metadata: Arc<dyn MetadataBackend>) -> Self {
        Self { ratings, metadata }
    }
}

/// State shared by the flows of one page load.
///
/// Holds what a page fetches once and reuses: the metadata API key, the
/// default movie id and the autocomplete title index. Dropping the context
/// drops the cache; nothing here outlives the command that built it.
#[derive(Clone)]
pub struct PageContext {
    backends: Backends,
    api_key: Option<String>,
    default_movie_id: Option<String>,
    titles: Option<TitleIndex>,
}

impl PageContext {
    pub fn new(backends: Backends) -> Self {
        Self {
            backends,
            api_key: None,
            default_movie_id: None,
            titles: None,
        }
    }

    pub fn ratings(&self) -> &dyn RatingsBackend {
        self.backends.ratings.as_ref()
    }

    pub fn metadata(&self) -> &dyn MetadataBackend {
        self.backends.metadata.as_ref()
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Cached metadata key, fetched from the ratings backend on first use.
    /// Failures are not cached.
    pub async fn api_key(&mut self) -> Result<String, SourceError> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        debug!("Fetching metadata API key from {}", self.ratings().source_name());
        let key = self.backends.ratings.api_key().await?;
        self.api_key = Some(key.clone());
        Ok(key)
    }

    pub fn default_movie_id(&self) -> Option<&str> {
        self.default_movie_id.as_deref()
    }

    pub fn set_default_movie_id(&mut self, movie_id: impl Into<String>) {
        let movie_id = movie_id.into();
        debug!("Default movie is {}", movie_id);
        self.default_movie_id = Some(movie_id);
    }

    pub fn titles(&self) -> Option<&TitleIndex> {
        self.titles.as_ref()
    }

    pub fn set_titles(&mut self, titles: TitleIndex) {
        debug!("Cached {} titles for suggestions", titles.len());
        self.titles = Some(titles);
    }
}
