use super::*;
use crate::context::Backends;
use crate::testing::{MockMetadata, MockRatings};
use chrono::{TimeZone, Utc};
use cineast_models::Score;
use std::sync::Arc;

fn record(id: &str, title: &str) -> MovieRecord {
    MovieRecord::new(id, title)
}

fn context(ratings: MockRatings, metadata: MockMetadata) -> (PageContext, Arc<MockRatings>, Arc<MockMetadata>) {
    let ratings = Arc::new(ratings);
    let metadata = Arc::new(metadata);
    let ctx = PageContext::new(Backends::new(ratings.clone(), metadata.clone()));
    (ctx, ratings, metadata)
}

fn review(movie_id: &str, author: &str, day: Option<u32>) -> ReviewRecord {
    ReviewRecord {
        movie_id: movie_id.to_string(),
        author: author.to_string(),
        score: Score::new(3).unwrap(),
        text: format!("Review by {}", author),
        date: day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()),
    }
}

#[tokio::test]
async fn test_toplist_ranks_and_joins() {
    let ratings = MockRatings::new()
        .with_movie("tt1", Some(3.5), 4)
        .with_movie("tt2", Some(1.2), 3)
        .with_movie("tt3", Some(2.0), 1);
    let metadata = MockMetadata::new()
        .with(record("tt1", "Good").with_year(1999))
        .with(record("tt2", "Bad"));
    let (mut ctx, _, _) = context(ratings, metadata);

    let result = toplist(&mut ctx, &ToplistQuery::top(11), &CancellationToken::new()).await.unwrap();

    assert!(!result.is_degraded());
    let ranked: Vec<(usize, &str)> = result.data.iter().map(|r| (r.rank, r.movie.id())).collect();
    assert_eq!(ranked, vec![(1, "tt1"), (2, "tt2")]);
    assert_eq!(result.data[0].movie.movie.community_score, Some(3.5));
    assert_eq!(result.data[0].movie.plot.as_deref(), Some("Plot of Good"));
}

#[tokio::test]
async fn test_toplist_then_rating_filter() {
    let ratings = MockRatings::new()
        .with_movie("tt1", Some(3.5), 4)
        .with_movie("tt2", Some(1.2), 3);
    let metadata = MockMetadata::new().with(record("tt1", "One")).with(record("tt2", "Two"));
    let (mut ctx, _, _) = context(ratings, metadata);

    let result = toplist(&mut ctx, &ToplistQuery::top(11), &CancellationToken::new()).await.unwrap();
    let movies: Vec<CombinedMovie> = result.data.into_iter().map(|r| r.movie).collect();
    let filtered = filter_movies(
        movies,
        &CriterionTable::default(),
        &ActiveCriteria::from_ids(["rating-3-4"]),
    );

    let ids: Vec<&str> = filtered.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["tt1"]);
}

#[tokio::test]
async fn test_worst_list_second_page_ranks() {
    let mut ratings = MockRatings::new();
    for i in 0..5 {
        ratings = ratings.with_movie(&format!("tt{}", i), Some(i as f64 * 0.5), 2);
    }
    let mut metadata = MockMetadata::new();
    for i in 0..5 {
        metadata = metadata.with(record(&format!("tt{}", i), &format!("Movie {}", i)));
    }
    let (mut ctx, _, _) = context(ratings, metadata);

    let query = ToplistQuery::worst(2).with_page(2);
    let result = toplist(&mut ctx, &query, &CancellationToken::new()).await.unwrap();

    let ranked: Vec<(usize, &str)> = result.data.iter().map(|r| (r.rank, r.movie.id())).collect();
    assert_eq!(ranked, vec![(3, "tt2"), (4, "tt3")]);
}

#[tokio::test]
async fn test_toplist_failure_is_degraded_not_fatal() {
    let (mut ctx, _, metadata) = context(MockRatings::new().failing_reads(), MockMetadata::new());

    let result = toplist(&mut ctx, &ToplistQuery::default(), &CancellationToken::new()).await.unwrap();

    assert!(result.data.is_empty());
    assert!(result.is_degraded());
    assert_eq!(metadata.calls(), 0);
}

#[tokio::test]
async fn test_empty_toplist_is_not_degraded() {
    let (mut ctx, _, _) = context(MockRatings::new(), MockMetadata::new());
    let result = toplist(&mut ctx, &ToplistQuery::default(), &CancellationToken::new()).await.unwrap();
    assert!(result.data.is_empty());
    assert!(!result.is_degraded());
}

#[tokio::test]
async fn test_search_partitions_rated_first() {
    let ratings = MockRatings::new().with_movie("tt0090605", Some(3.8), 6);
    let metadata = MockMetadata::new()
        .with(record("tt0078748", "Alien").with_year(1979).with_genres(["Horror", "Sci-Fi"]))
        .with(record("tt0090605", "Aliens").with_year(1986).with_genres(["Action", "Sci-Fi"]))
        .with(record("tt0133093", "The Matrix"));
    let (mut ctx, _, _) = context(ratings, metadata);

    let result = search(
        &mut ctx,
        "  alien ",
        &CriterionTable::default(),
        &ActiveCriteria::new(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(!result.is_degraded());
    let rated: Vec<&str> = result.data.rated.iter().map(|m| m.id()).collect();
    let unrated: Vec<&str> = result.data.metadata_only.iter().map(|m| m.id()).collect();
    assert_eq!(rated, vec!["tt0090605"]);
    assert_eq!(unrated, vec!["tt0078748"]);
}

#[tokio::test]
async fn test_search_applies_active_criteria() {
    let metadata = MockMetadata::new()
        .with(record("tt1", "Space One").with_genres(["Horror"]))
        .with(record("tt2", "Space Two").with_genres(["Comedy"]));
    let (mut ctx, _, _) = context(MockRatings::new(), metadata);

    let result = search(
        &mut ctx,
        "space",
        &CriterionTable::default(),
        &ActiveCriteria::from_ids(["genre-comedy"]),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let ids: Vec<&str> = result.data.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["tt2"]);
}

#[tokio::test]
async fn test_search_skips_failed_lookups() {
    let metadata = MockMetadata::new()
        .with(record("tt1", "Heat"))
        .with(record("tt2", "Heathers"))
        .broken("tt1");
    let (mut ctx, _, _) = context(MockRatings::new(), metadata);

    let result = search(&mut ctx, "heat", &CriterionTable::default(), &ActiveCriteria::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_degraded());
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data.metadata_only[0].id(), "tt2");
}

#[tokio::test]
async fn test_blank_search_makes_no_requests() {
    let (mut ctx, ratings, metadata) = context(MockRatings::new(), MockMetadata::new());

    let result = search(&mut ctx, "   ", &CriterionTable::default(), &ActiveCriteria::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.data.is_empty());
    assert_eq!(ratings.calls() + metadata.calls(), 0);
}

#[tokio::test]
async fn test_search_suggestions_cap() {
    let metadata = MockMetadata::new()
        .with(record("tt1", "Star A"))
        .with(record("tt2", "Star B"))
        .with(record("tt3", "Star C"))
        .with(record("tt4", "Star D"));
    let (mut ctx, _, _) = context(MockRatings::new(), metadata);

    let result = search_suggestions(&mut ctx, "star", 3, &CancellationToken::new()).await.unwrap();
    assert_eq!(result.data.len(), 3);
}

#[tokio::test]
async fn test_movie_page_defaults_to_top_movie_and_sorts_reviews() {
    let ratings = MockRatings::new()
        .with_movie("tt1", Some(3.9), 5)
        .with_movie("tt2", Some(2.0), 5)
        .with_review(review("tt1", "Old", Some(1)))
        .with_review(review("tt1", "Undated", None))
        .with_review(review("tt1", "New", Some(20)));
    let metadata = MockMetadata::new().with(record("tt1", "Top"));
    let (mut ctx, _, _) = context(ratings, metadata);

    let result = movie_page(&mut ctx, None, &CancellationToken::new()).await.unwrap();
    let page = result.data.unwrap();

    assert_eq!(page.movie_id, "tt1");
    assert_eq!(ctx.default_movie_id(), Some("tt1"));
    assert_eq!(page.details.map(|d| d.record.title), Some("Top".to_string()));
    let authors: Vec<&str> = page.ratings.reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, vec!["New", "Old", "Undated"]);
}

#[tokio::test]
async fn test_movie_page_review_pages() {
    let mut ratings = MockRatings::new().with_movie("tt1", Some(3.0), 7);
    for day in 1..=7 {
        ratings = ratings.with_review(review("tt1", &format!("R{}", day), Some(day)));
    }
    let (mut ctx, _, _) = context(ratings, MockMetadata::new().with(record("tt1", "Seven")));

    let page = movie_page(&mut ctx, Some("tt1"), &CancellationToken::new())
        .await
        .unwrap()
        .data
        .unwrap();
    let reviews = page.reviews(3);

    assert_eq!(reviews.page_count(), 3);
    assert_eq!(reviews.slice(3).len(), 1);
    assert_eq!(reviews.slice(3)[0].author, "R1");
    assert!(reviews.slice(4).is_empty());
}

#[tokio::test]
async fn test_unrated_movie_page_is_not_degraded() {
    let (mut ctx, _, _) = context(MockRatings::new(), MockMetadata::new().with(record("tt7", "Fresh")));

    let result = movie_page(&mut ctx, Some("tt7"), &CancellationToken::new()).await.unwrap();

    assert!(!result.is_degraded());
    let page = result.data.unwrap();
    assert_eq!(page.ratings.summary.count, 0);
    assert!(page.details.is_some());
}

#[tokio::test]
async fn test_full_plot() {
    let (mut ctx, _, _) = context(MockRatings::new(), MockMetadata::new().with(record("tt1", "Long")));
    let plot = full_plot(&mut ctx, "tt1", &CancellationToken::new()).await.unwrap();
    assert_eq!(plot.data.as_deref(), Some("Plot of Long (full)"));
}

#[tokio::test]
async fn test_missing_key_degrades_detail_lookup() {
    let ratings = MockRatings::new().with_movie("tt1", Some(3.0), 2).without_key();
    let (mut ctx, _, metadata) = context(ratings, MockMetadata::new().with(record("tt1", "Locked")));

    let result = movie_page(&mut ctx, Some("tt1"), &CancellationToken::new()).await.unwrap();

    assert!(result.is_degraded());
    assert!(result.data.unwrap().details.is_none());
    assert_eq!(metadata.calls(), 0);
}

#[tokio::test]
async fn test_api_key_is_fetched_once_per_context() {
    let ratings = MockRatings::new().with_movie("tt1", Some(3.0), 2);
    let (mut ctx, ratings, _) = context(ratings, MockMetadata::new().with(record("tt1", "Once")));

    full_plot(&mut ctx, "tt1", &CancellationToken::new()).await.unwrap();
    full_plot(&mut ctx, "tt1", &CancellationToken::new()).await.unwrap();

    assert_eq!(ratings.calls(), 1);
}

#[tokio::test]
async fn test_latest_review_with_title() {
    let ratings = MockRatings::new().with_latest(review("tt1", "Ada", Some(5)));
    let (mut ctx, _, _) = context(ratings, MockMetadata::new().with(record("tt1", "Reviewed")));

    let latest = latest_review(&mut ctx, &CancellationToken::new()).await.unwrap().data.unwrap();

    assert_eq!(latest.review.author, "Ada");
    assert_eq!(latest.title.as_deref(), Some("Reviewed"));
}

#[tokio::test]
async fn test_suggest_uses_titles_known_to_both_backends() {
    let ratings = MockRatings::new()
        .with_movie("tt1", Some(3.0), 2)
        .with_movie("tt2", Some(2.0), 2)
        .with_movie("tt3", Some(1.0), 2);
    let metadata = MockMetadata::new()
        .with(record("tt1", "The Thing"))
        .with(record("tt2", "Thelma"))
        .with(record("tt4", "The Fly"));
    let (mut ctx, _, metadata) = context(ratings, metadata);

    let first = suggest(&mut ctx, "the", 4, &CancellationToken::new()).await.unwrap();
    let titles: Vec<&str> = first.data.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["The Thing", "Thelma"]);
    assert!(first.is_degraded());

    let empty = suggest(&mut ctx, "", 4, &CancellationToken::new()).await.unwrap();
    assert!(empty.data.is_empty());
    assert!(metadata.calls() > 0);
}

#[tokio::test]
async fn test_title_index_is_cached_when_clean() {
    let ratings = MockRatings::new().with_movie("tt1", Some(3.0), 2);
    let (mut ctx, _, metadata) = context(ratings, MockMetadata::new().with(record("tt1", "Cached")));

    suggest(&mut ctx, "ca", 4, &CancellationToken::new()).await.unwrap();
    let calls = metadata.calls();
    let again = suggest(&mut ctx, "cach", 4, &CancellationToken::new()).await.unwrap();

    assert_eq!(again.data.len(), 1);
    assert_eq!(metadata.calls(), calls);
}

#[tokio::test]
async fn test_superseded_flow_is_cancelled() {
    let ratings = MockRatings::new()
        .with_latest(review("tt1", "Slow", Some(1)))
        .with_latest_delay(Duration::from_secs(30));
    let (ctx, _, _) = context(ratings, MockMetadata::new().with(record("tt1", "Slow")));
    let slot = RequestSlot::new();

    let stale = slot.begin();
    let mut stale_ctx = ctx.clone();
    let handle = tokio::spawn(async move { latest_review(&mut stale_ctx, &stale).await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let _fresh = slot.begin();
    let result = handle.await.unwrap();
    assert_eq!(result, Err(Cancelled));
}

#[tokio::test]
async fn test_follow_latest_polls_until_stopped() {
    let ratings = MockRatings::new().with_latest(review("tt1", "Ada", Some(2)));
    let (ctx, _, _) = context(ratings, MockMetadata::new().with(record("tt1", "Polled")));
    let stop = CancellationToken::new();

    let mut updates = follow_latest(ctx, Duration::from_millis(10), stop.clone());
    for _ in 0..2 {
        let update = updates.recv().await.unwrap();
        assert_eq!(update.data.and_then(|l| l.title).as_deref(), Some("Polled"));
    }

    stop.cancel();
    while updates.recv().await.is_some() {}
}
