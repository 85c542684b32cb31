// Join logic between the metadata backend and the ratings backend

use cineast_models::{CombinedMovie, MovieDetails, MovieRecord, RatingSummary};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Anything the metadata backend hands back that can be joined on imdbID.
pub trait MetadataEntry {
    fn movie_id(&self) -> &str;

    /// Split into the record and the plot text, if the entry carries one
    fn into_parts(self) -> (MovieRecord, Option<String>);
}

impl MetadataEntry for MovieRecord {
    fn movie_id(&self) -> &str {
        &self.id
    }

    fn into_parts(self) -> (MovieRecord, Option<String>) {
        (self, None)
    }
}

impl MetadataEntry for MovieDetails {
    fn movie_id(&self) -> &str {
        &self.record.id
    }

    fn into_parts(self) -> (MovieRecord, Option<String>) {
        (self.record, self.plot)
    }
}

/// First summary per id wins, later duplicates are ignored
fn index_ratings(ratings: &[RatingSummary]) -> HashMap<&str, &RatingSummary> {
    let mut index = HashMap::with_capacity(ratings.len());
    for summary in ratings {
        index.entry(summary.movie_id.as_str()).or_insert(summary);
    }
    index
}

/// Join metadata with ratings, keeping metadata order.
///
/// Each distinct metadata id yields exactly one output entry: `Rated` when the
/// ratings list knows the id, `MetadataOnly` otherwise. Ratings entries with no
/// metadata counterpart are dropped.
pub fn combine<M: MetadataEntry>(ratings: &[RatingSummary], metadata: Vec<M>) -> Vec<CombinedMovie> {
    let index = index_ratings(ratings);
    let mut seen = HashSet::new();
    let mut combined = Vec::with_capacity(metadata.len());
    let mut duplicates = 0;

    for entry in metadata {
        if !seen.insert(entry.movie_id().to_string()) {
            duplicates += 1;
            continue;
        }
        let (record, plot) = entry.into_parts();
        let movie = match index.get(record.id.as_str()) {
            Some(summary) => CombinedMovie::rated(record, (*summary).clone()),
            None => CombinedMovie::metadata_only(record),
        };
        combined.push(movie.with_plot(plot));
    }

    let rated = combined.iter().filter(|m| m.is_rated()).count();
    debug!(
        "combine: metadata={}, ratings={}, rated={}, metadata_only={}, duplicates={}",
        seen.len() + duplicates,
        ratings.len(),
        rated,
        combined.len() - rated,
        duplicates
    );
    combined
}

/// Only the entries present in both backends, in metadata order.
pub fn combine_rated<M: MetadataEntry>(ratings: &[RatingSummary], metadata: Vec<M>) -> Vec<CombinedMovie> {
    combine(ratings, metadata)
        .into_iter()
        .filter(CombinedMovie::is_rated)
        .collect()
}
