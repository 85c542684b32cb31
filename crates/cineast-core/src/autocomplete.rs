use cineast_models::CombinedMovie;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleEntry {
    pub id: String,
    pub title: String,
}

impl TitleEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Case-insensitive prefix test; an empty query matches nothing
    pub fn matches(&self, query: &str) -> bool {
        !query.is_empty() && self.title.to_lowercase().starts_with(&query.to_lowercase())
    }

    /// Split the title after as many characters as the query has,
    /// for highlighting the typed part
    pub fn split_match(&self, query: &str) -> (&str, &str) {
        let cut = self
            .title
            .char_indices()
            .nth(query.chars().count())
            .map(|(i, _)| i)
            .unwrap_or(self.title.len());
        self.title.split_at(cut)
    }
}

/// Titles the suggestion box draws from, in cache order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleIndex {
    entries: Vec<TitleEntry>,
}

impl TitleIndex {
    pub fn new(entries: Vec<TitleEntry>) -> Self {
        Self { entries }
    }

    pub fn from_movies(movies: &[CombinedMovie]) -> Self {
        Self::new(
            movies
                .iter()
                .map(|m| TitleEntry::new(m.id(), m.movie.title.clone()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry whose title starts with `query`, in index order
    pub fn matches<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a TitleEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.matches(query))
    }

    /// Suggestions borrow from the index only, so the query can be dropped
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<&TitleEntry> {
        self.entries.iter().filter(|entry| entry.matches(query)).take(limit).collect()
    }
}
