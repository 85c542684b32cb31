use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::rating::RatingSummary;

/// A movie as seen by the client for one fetch cycle.
///
/// `year` and `runtime_minutes` are absent when the metadata backend reports
/// them as "N/A" or in a shape that cannot be parsed. Absent values never
/// satisfy a range criterion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: String, // imdbID, shared across both backends
    pub title: String,
    pub year: Option<i32>,
    pub genres: BTreeSet<String>,
    pub runtime_minutes: Option<u32>,
    /// Community score from the ratings backend (0-4)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl MovieRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: None,
            genres: BTreeSet::new(),
            runtime_minutes: None,
            community_score: None,
            poster_url: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime_minutes = Some(minutes);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.community_score = Some(score);
        self
    }

    /// Case-sensitive exact membership test
    pub fn has_genre(&self, name: &str) -> bool {
        self.genres.contains(name)
    }

    /// Genres joined the way the metadata backend reports them ("Action, Drama")
    pub fn genre_line(&self) -> String {
        self.genres.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Full metadata for the movie detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub record: MovieRecord,
    pub released: Option<String>,
    pub plot: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub imdb_rating: Option<String>,
}

/// What the ratings backend contributed to a combined movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Enrichment {
    /// Present in both backends
    Rated(RatingSummary),
    /// Only known to the metadata backend; nobody has rated it yet
    MetadataOnly,
}

/// View-model produced by joining metadata with ratings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedMovie {
    pub movie: MovieRecord,
    pub enrichment: Enrichment,
    /// Plot text carried through from the metadata fetch, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
}

impl CombinedMovie {
    pub fn metadata_only(movie: MovieRecord) -> Self {
        Self {
            movie,
            enrichment: Enrichment::MetadataOnly,
            plot: None,
        }
    }

    pub fn rated(mut movie: MovieRecord, summary: RatingSummary) -> Self {
        movie.community_score = summary.score;
        Self {
            movie,
            enrichment: Enrichment::Rated(summary),
            plot: None,
        }
    }

    pub fn with_plot(mut self, plot: Option<String>) -> Self {
        self.plot = plot;
        self
    }

    pub fn id(&self) -> &str {
        &self.movie.id
    }

    pub fn is_rated(&self) -> bool {
        matches!(self.enrichment, Enrichment::Rated(_))
    }

    pub fn rating(&self) -> Option<&RatingSummary> {
        match &self.enrichment {
            Enrichment::Rated(summary) => Some(summary),
            Enrichment::MetadataOnly => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_membership_is_case_sensitive() {
        let movie = MovieRecord::new("tt0133093", "The Matrix").with_genres(["Action", "Sci-Fi"]);
        assert!(movie.has_genre("Action"));
        assert!(!movie.has_genre("action"));
        assert_eq!(movie.genre_line(), "Action, Sci-Fi");
    }

    #[test]
    fn test_rated_copies_score_into_record() {
        let summary = RatingSummary::new("tt1", Some(3.5), 12);
        let combined = CombinedMovie::rated(MovieRecord::new("tt1", "One"), summary);
        assert_eq!(combined.movie.community_score, Some(3.5));
        assert!(combined.is_rated());
        assert_eq!(combined.rating().map(|r| r.count), Some(12));
    }
}
