//! Inclusion filtering over combined search results.
//!
//! Criteria live in a [`CriterionTable`] keyed by id; the caller only decides
//! which ids are active. A movie passes when it satisfies every active
//! criterion, including several criteria on the same field, so activating two
//! decades at once yields nothing.

use cineast_models::{CombinedMovie, MovieRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterCriterion {
    RatingRange { min: f64, max: f64 },
    YearRange { min: i32, max: i32 },
    RuntimeRange { min: u32, max: u32 },
    GenreEquals { name: String },
}

impl FilterCriterion {
    /// Bounds are inclusive. Missing values never match a range.
    pub fn matches(&self, movie: &MovieRecord) -> bool {
        match self {
            FilterCriterion::RatingRange { min, max } => movie
                .community_score
                .map(|score| *min <= score && score <= *max)
                .unwrap_or(false),
            FilterCriterion::YearRange { min, max } => movie
                .year
                .map(|year| (*min..=*max).contains(&year))
                .unwrap_or(false),
            FilterCriterion::RuntimeRange { min, max } => movie
                .runtime_minutes
                .map(|minutes| (*min..=*max).contains(&minutes))
                .unwrap_or(false),
            FilterCriterion::GenreEquals { name } => movie.has_genre(name),
        }
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCriterion::RatingRange { min, max } => write!(f, "rating {}-{}", min, max),
            FilterCriterion::YearRange { min, max } => write!(f, "year {}-{}", min, max),
            FilterCriterion::RuntimeRange { min, max } => write!(f, "runtime {}-{} min", min, max),
            FilterCriterion::GenreEquals { name } => write!(f, "genre {}", name),
        }
    }
}

/// Ordered id → criterion table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionTable {
    entries: Vec<(String, FilterCriterion)>,
}

impl CriterionTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adding an id twice replaces the earlier criterion in place
    pub fn with(mut self, id: impl Into<String>, criterion: FilterCriterion) -> Self {
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = criterion,
            None => self.entries.push((id, criterion)),
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&FilterCriterion> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, criterion)| criterion)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCriterion)> {
        self.entries.iter().map(|(id, criterion)| (id.as_str(), criterion))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The active criteria, in table order
    pub fn active<'a>(&'a self, active: &'a ActiveCriteria) -> impl Iterator<Item = &'a FilterCriterion> + 'a {
        self.entries
            .iter()
            .filter(move |(id, _)| active.is_active(id))
            .map(|(_, criterion)| criterion)
    }

    /// Does the movie satisfy every active criterion?
    pub fn admits(&self, active: &ActiveCriteria, movie: &MovieRecord) -> bool {
        self.active(active).all(|criterion| criterion.matches(movie))
    }
}

impl Default for CriterionTable {
    /// The search page's stock criteria
    fn default() -> Self {
        let rating = |min: f64, max: f64| FilterCriterion::RatingRange { min, max };
        let year = |min: i32, max: i32| FilterCriterion::YearRange { min, max };
        let runtime = |min: u32, max: u32| FilterCriterion::RuntimeRange { min, max };
        let genre = |name: &str| FilterCriterion::GenreEquals { name: name.to_string() };

        CriterionTable::new()
            .with("rating-0-1", rating(0.0, 1.0))
            .with("rating-1-2", rating(1.0, 2.0))
            .with("rating-2-3", rating(2.0, 3.0))
            .with("rating-3-4", rating(3.0, 4.0))
            .with("year-1900-1979", year(1900, 1979))
            .with("year-1980-1989", year(1980, 1989))
            .with("year-1990-1999", year(1990, 1999))
            .with("year-2000-2009", year(2000, 2009))
            .with("year-2010-2024", year(2010, 2024))
            .with("runtime-short", runtime(0, 59))
            .with("runtime-medium", runtime(60, 119))
            .with("runtime-long", runtime(120, 1000))
            .with("genre-action", genre("Action"))
            .with("genre-comedy", genre("Comedy"))
            .with("genre-horror", genre("Horror"))
            .with("genre-fantasy", genre("Fantasy"))
            .with("genre-adventure", genre("Adventure"))
    }
}

/// Criterion id → on/off, as supplied by the front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCriteria(BTreeMap<String, bool>);

impl ActiveCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed id switched on
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(|id| (id.into(), true)).collect())
    }

    pub fn set(&mut self, id: impl Into<String>, on: bool) {
        self.0.insert(id.into(), on);
    }

    pub fn toggle(&mut self, id: &str) {
        let on = !self.is_active(id);
        self.set(id, on);
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, on)| **on).map(|(id, _)| id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.active_ids().next().is_none()
    }
}

/// Filter output, split by whether the ratings backend knows the movie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredMovies {
    pub rated: Vec<CombinedMovie>,
    pub metadata_only: Vec<CombinedMovie>,
}

impl FilteredMovies {
    pub fn len(&self) -> usize {
        self.rated.len() + self.metadata_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scored movies first, then the metadata-only ones
    pub fn iter(&self) -> impl Iterator<Item = &CombinedMovie> {
        self.rated.iter().chain(self.metadata_only.iter())
    }

    pub fn into_display_order(self) -> Vec<CombinedMovie> {
        let mut movies = self.rated;
        movies.extend(self.metadata_only);
        movies
    }
}

/// Keep the movies that pass every active criterion, preserving input order.
pub fn filter_movies(movies: Vec<CombinedMovie>, table: &CriterionTable, active: &ActiveCriteria) -> FilteredMovies {
    let total = movies.len();
    let mut seen = HashSet::new();
    let mut filtered = FilteredMovies::default();
    let mut rejected = 0;

    for movie in movies {
        if !seen.insert(movie.id().to_string()) {
            continue;
        }
        if !table.admits(active, &movie.movie) {
            rejected += 1;
            continue;
        }
        if movie.is_rated() {
            filtered.rated.push(movie);
        } else {
            filtered.metadata_only.push(movie);
        }
    }

    debug!(
        "filter_movies: input={}, active={:?}, rated={}, metadata_only={}, rejected={}",
        total,
        active.active_ids().collect::<Vec<_>>(),
        filtered.rated.len(),
        filtered.metadata_only.len(),
        rejected
    );
    filtered
}
