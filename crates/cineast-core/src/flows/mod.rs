//! Read flows behind each view.
//!
//! Every flow is a short sequential chain: list from one backend, then one
//! lookup per item in the other. Failures never abort a flow; they are logged
//! and recorded on the returned [`Fetched`], whose data falls back to an empty
//! value. Only cancellation ends a flow early.

use crate::autocomplete::{TitleEntry, TitleIndex};
use crate::cancel::{guarded, Cancelled, RequestSlot};
use crate::combine::{combine, combine_rated};
use crate::context::PageContext;
use crate::filter::{filter_movies, ActiveCriteria, CriterionTable, FilteredMovies};
use crate::paginate::Paginator;
use cineast_models::{
    CombinedMovie, LatestReview, MovieDetails, MovieRatings, MovieRecord, ReviewRecord, ToplistQuery,
};
use cineast_sources::{MetadataBackend, SourceError};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Flow output plus whatever went wrong while producing it.
///
/// An empty `data` with no errors means the backends had nothing; with
/// errors it means the fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> Fetched<T> {
    pub fn new(data: T) -> Self {
        Self { data, errors: Vec::new() }
    }

    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    fn note(&mut self, what: &str, error: impl fmt::Display) {
        warn!("{} failed: {}", what, error);
        self.errors.push(format!("{}: {}", what, error));
    }

    fn note_all(&mut self, failures: Vec<(String, SourceError)>) {
        for (movie_id, error) in failures {
            self.note(&format!("metadata for {}", movie_id), error);
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            errors: self.errors,
        }
    }

    fn with_data<U>(self, data: U) -> Fetched<U> {
        Fetched { data, errors: self.errors }
    }
}

pub type FlowResult<T> = Result<Fetched<T>, Cancelled>;

/// A top-list entry with its position in the full ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMovie {
    pub rank: usize,
    pub movie: CombinedMovie,
}

/// Everything the movie detail view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoviePage {
    pub movie_id: String,
    pub details: Option<MovieDetails>,
    /// Reviews are newest first
    pub ratings: MovieRatings,
}

impl MoviePage {
    pub fn reviews(&self, page_size: usize) -> Paginator<'_, ReviewRecord> {
        Paginator::new(&self.ratings.reviews, page_size)
    }
}

/// Newest first; undated reviews sink to the end
pub fn sort_reviews(reviews: &mut [ReviewRecord]) {
    reviews.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The cached key, or a recorded failure
async fn api_key<T>(ctx: &mut PageContext, out: &mut Fetched<T>, cancel: &CancellationToken) -> Result<Option<String>, Cancelled> {
    match guarded(cancel, ctx.api_key()).await? {
        Ok(key) => Ok(Some(key)),
        Err(e) => {
            out.note("metadata API key", e);
            Ok(None)
        }
    }
}

/// One metadata lookup per id, in order. Failed ids are returned alongside.
async fn lookup_each(
    metadata: &dyn MetadataBackend,
    key: &str,
    ids: &[String],
    cancel: &CancellationToken,
) -> Result<(Vec<MovieDetails>, Vec<(String, SourceError)>), Cancelled> {
    let mut found = Vec::with_capacity(ids.len());
    let mut failed = Vec::new();
    for movie_id in ids {
        match guarded(cancel, metadata.movie(key, movie_id, false)).await? {
            Ok(details) => found.push(details),
            Err(e) => failed.push((movie_id.clone(), e)),
        }
    }
    debug!("lookup_each: requested={}, found={}, failed={}", ids.len(), found.len(), failed.len());
    Ok((found, failed))
}

/// One page of the top list (or the worst list, for `SortOrder::Asc`).
pub async fn toplist(ctx: &mut PageContext, query: &ToplistQuery, cancel: &CancellationToken) -> FlowResult<Vec<RankedMovie>> {
    let mut out = Fetched::new(Vec::new());

    let summaries = match guarded(cancel, ctx.ratings().toplist(query)).await? {
        Ok(summaries) => summaries,
        Err(e) => {
            out.note("toplist", e);
            return Ok(out);
        }
    };
    if summaries.is_empty() {
        return Ok(out);
    }
    let Some(key) = api_key(ctx, &mut out, cancel).await? else {
        return Ok(out);
    };

    let ids: Vec<String> = summaries.iter().map(|s| s.movie_id.clone()).collect();
    let (details, failed) = lookup_each(ctx.metadata(), &key, &ids, cancel).await?;
    out.note_all(failed);

    let ranks: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), query.first_rank() + i))
        .collect();
    let ranked: Vec<RankedMovie> = combine_rated(&summaries, details)
        .into_iter()
        .map(|movie| RankedMovie {
            rank: ranks.get(movie.id()).copied().unwrap_or_default(),
            movie,
        })
        .collect();

    info!("Toplist page {} ({:?}): {} movies", query.page, query.sort, ranked.len());
    Ok(out.with_data(ranked))
}

/// Search the metadata backend, join with community ratings and filter.
pub async fn search(
    ctx: &mut PageContext,
    query: &str,
    table: &CriterionTable,
    active: &ActiveCriteria,
    cancel: &CancellationToken,
) -> FlowResult<FilteredMovies> {
    let mut out = Fetched::new(FilteredMovies::default());
    let query = query.trim();
    if query.is_empty() {
        return Ok(out);
    }

    let ratings = match guarded(cancel, ctx.ratings().all_movies()).await? {
        Ok(ratings) => ratings,
        Err(e) => {
            out.note("community ratings", e);
            Vec::new()
        }
    };
    let Some(key) = api_key(ctx, &mut out, cancel).await? else {
        return Ok(out);
    };

    let hits = match guarded(cancel, ctx.metadata().search(&key, query)).await? {
        Ok(hits) => hits,
        Err(e) => {
            out.note("search", e);
            return Ok(out);
        }
    };
    let ids: Vec<String> = hits.into_iter().map(|hit| hit.id).collect();
    let (details, failed) = lookup_each(ctx.metadata(), &key, &ids, cancel).await?;
    out.note_all(failed);

    let filtered = filter_movies(combine(&ratings, details), table, active);
    info!("Search '{}': {} hits, {} after filtering", query, ids.len(), filtered.len());
    Ok(out.with_data(filtered))
}

/// The first few raw search hits, for the search page's suggestion list
pub async fn search_suggestions(
    ctx: &mut PageContext,
    query: &str,
    limit: usize,
    cancel: &CancellationToken,
) -> FlowResult<Vec<MovieRecord>> {
    let mut out = Fetched::new(Vec::new());
    if query.trim().is_empty() {
        return Ok(out);
    }
    let Some(key) = api_key(ctx, &mut out, cancel).await? else {
        return Ok(out);
    };
    match guarded(cancel, ctx.metadata().search(&key, query.trim())).await? {
        Ok(mut hits) => {
            hits.truncate(limit);
            Ok(out.with_data(hits))
        }
        Err(e) => {
            out.note("search suggestions", e);
            Ok(out)
        }
    }
}

/// Highest ranked movie, used when no movie id is given. Cached per context.
pub async fn default_movie_id(ctx: &mut PageContext, cancel: &CancellationToken) -> FlowResult<Option<String>> {
    let mut out = Fetched::new(None);
    if let Some(id) = ctx.default_movie_id() {
        return Ok(out.with_data(Some(id.to_string())));
    }
    match guarded(cancel, ctx.ratings().toplist(&ToplistQuery::top(1))).await? {
        Ok(summaries) => {
            if let Some(first) = summaries.into_iter().next() {
                ctx.set_default_movie_id(first.movie_id.clone());
                out.data = Some(first.movie_id);
            }
        }
        Err(e) => out.note("default movie", e),
    }
    Ok(out)
}

/// Detail view of one movie; `None` selects the default movie.
pub async fn movie_page(ctx: &mut PageContext, movie_id: Option<&str>, cancel: &CancellationToken) -> FlowResult<Option<MoviePage>> {
    let mut out = Fetched::new(None);
    let movie_id = match movie_id {
        Some(id) => id.to_string(),
        None => {
            let fallback = default_movie_id(ctx, cancel).await?;
            out.errors.extend(fallback.errors);
            match fallback.data {
                Some(id) => id,
                None => return Ok(out),
            }
        }
    };

    let mut ratings = match guarded(cancel, ctx.ratings().movie(&movie_id)).await? {
        Ok(ratings) => ratings,
        Err(SourceError::NotFound(_)) => {
            debug!("{} has no community ratings yet", movie_id);
            MovieRatings::empty(&movie_id)
        }
        Err(e) => {
            out.note("community ratings", e);
            MovieRatings::empty(&movie_id)
        }
    };
    sort_reviews(&mut ratings.reviews);

    let details = match api_key(ctx, &mut out, cancel).await? {
        Some(key) => match guarded(cancel, ctx.metadata().movie(&key, &movie_id, false)).await? {
            Ok(details) => Some(details),
            Err(e) => {
                out.note("movie details", e);
                None
            }
        },
        None => None,
    };

    Ok(out.with_data(Some(MoviePage {
        movie_id,
        details,
        ratings,
    })))
}

/// The long plot text for one movie
pub async fn full_plot(ctx: &mut PageContext, movie_id: &str, cancel: &CancellationToken) -> FlowResult<Option<String>> {
    let mut out = Fetched::new(None);
    let Some(key) = api_key(ctx, &mut out, cancel).await? else {
        return Ok(out);
    };
    match guarded(cancel, ctx.metadata().movie(&key, movie_id, true)).await? {
        Ok(details) => out.data = details.plot,
        Err(e) => out.note("full plot", e),
    }
    Ok(out)
}

/// The most recent review anywhere, with the reviewed movie's title.
pub async fn latest_review(ctx: &mut PageContext, cancel: &CancellationToken) -> FlowResult<Option<LatestReview>> {
    let mut out = Fetched::new(None);
    let review = match guarded(cancel, ctx.ratings().latest_review()).await? {
        Ok(review) => review,
        Err(e) => {
            out.note("latest review", e);
            return Ok(out);
        }
    };

    let title = match api_key(ctx, &mut out, cancel).await? {
        Some(key) => match guarded(cancel, ctx.metadata().movie(&key, &review.movie_id, false)).await? {
            Ok(details) => Some(details.record.title),
            Err(e) => {
                out.note("latest review title", e);
                None
            }
        },
        None => None,
    };
    Ok(out.with_data(Some(LatestReview { review, title })))
}

/// Poll [`latest_review`] every `every` until `stop` fires.
///
/// Each poll supersedes the previous one, so a poll still waiting on the
/// network when the next tick arrives is cancelled rather than reported late.
/// The channel closes once polling has stopped.
pub fn follow_latest(ctx: PageContext, every: Duration, stop: CancellationToken) -> mpsc::Receiver<Fetched<Option<LatestReview>>> {
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        let mut ctx = ctx;
        let slot = RequestSlot::with_parent(stop.clone());
        if let Ok(Err(e)) = guarded(&stop, ctx.api_key()).await {
            warn!("Polling without a metadata key: {}", e);
        }

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if tx.is_closed() {
                break;
            }

            let token = slot.begin();
            let mut poll_ctx = ctx.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Ok(result) = latest_review(&mut poll_ctx, &token).await {
                    if !token.is_cancelled() {
                        let _ = tx.send(result).await;
                    }
                }
            });
        }
        slot.cancel();
        debug!("Stopped following latest reviews");
    });

    rx
}

/// Titles known to both backends, cached on the context once fetched cleanly.
pub async fn title_index(ctx: &mut PageContext, cancel: &CancellationToken) -> FlowResult<TitleIndex> {
    if let Some(index) = ctx.titles() {
        return Ok(Fetched::new(index.clone()));
    }
    let mut out = Fetched::new(TitleIndex::default());

    let ratings = match guarded(cancel, ctx.ratings().all_movies()).await? {
        Ok(ratings) => ratings,
        Err(e) => {
            out.note("community ratings", e);
            return Ok(out);
        }
    };
    let Some(key) = api_key(ctx, &mut out, cancel).await? else {
        return Ok(out);
    };
    let ids: Vec<String> = ratings.iter().map(|r| r.movie_id.clone()).collect();
    let (details, failed) = lookup_each(ctx.metadata(), &key, &ids, cancel).await?;
    out.note_all(failed);

    let index = TitleIndex::from_movies(&combine_rated(&ratings, details));
    if !out.is_degraded() {
        ctx.set_titles(index.clone());
    }
    Ok(out.with_data(index))
}

/// Title suggestions for the global search bar
pub async fn suggest(ctx: &mut PageContext, prefix: &str, limit: usize, cancel: &CancellationToken) -> FlowResult<Vec<TitleEntry>> {
    if prefix.is_empty() {
        return Ok(Fetched::new(Vec::new()));
    }
    let index = title_index(ctx, cancel).await?;
    Ok(index.map(|index| index.suggest(prefix, limit).into_iter().cloned().collect()))
}
