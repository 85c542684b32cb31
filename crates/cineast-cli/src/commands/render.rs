use cineast_core::{MoviePage, Page, RankedMovie};
use cineast_models::{CombinedMovie, LatestReview, RatingSummary, ReviewRecord, Score};
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{:.1}/{}", score, Score::MAX),
        None => "-".to_string(),
    }
}

fn text_or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn year(movie: &CombinedMovie) -> String {
    movie.movie.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_toplist(movies: &[RankedMovie], title: &str) {
    println!("\n{}", title.bright_cyan().bold());
    let mut table = table();
    table.set_header(header(&["#", "Title", "Year", "Score", "Ratings", "IMDb id"]));
    for entry in movies {
        let summary = entry.movie.rating();
        table.add_row(vec![
            Cell::new(entry.rank),
            Cell::new(&entry.movie.movie.title),
            Cell::new(year(&entry.movie)),
            Cell::new(format_score(entry.movie.movie.community_score)),
            Cell::new(summary.map(|s| s.count).unwrap_or(0)),
            Cell::new(entry.movie.id()).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
}

pub fn print_search_page(page: &Page<'_, CombinedMovie>, query: &str) {
    println!(
        "\n{} {}",
        format!("Results for \"{}\"", query).bright_cyan().bold(),
        format!("(page {} of {}, {} movies)", page.page_index, page.page_count.max(1), page.total).bright_black()
    );
    let mut table = table();
    table.set_header(header(&["Title", "Year", "Runtime", "Genres", "Score", "IMDb id"]));
    for movie in page.items {
        let score = if movie.is_rated() {
            Cell::new(format_score(movie.movie.community_score)).fg(Color::Green)
        } else {
            Cell::new("unrated").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&movie.movie.title),
            Cell::new(year(movie)),
            Cell::new(
                movie
                    .movie
                    .runtime_minutes
                    .map(|m| format!("{} min", m))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(movie.movie.genre_line()),
            score,
            Cell::new(movie.id()).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
    if page.has_next() {
        println!("{}", format!("More results: --page {}", page.page_index + 1).bright_black());
    }
}

/// One bar per score, widest bar = most votes
fn print_distribution(summary: &RatingSummary) {
    let distribution = summary.distribution();
    let max = distribution.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    for (score, count) in distribution {
        let width = (count as usize * 20).div_ceil(max as usize);
        println!("  {} {} {}", score, "█".repeat(width).yellow(), count.bright_black());
    }
}

pub fn print_movie_page(page: &MoviePage, reviews: &Page<'_, ReviewRecord>, plot: Option<&str>) {
    let summary = &page.ratings.summary;
    let title = page
        .details
        .as_ref()
        .map(|d| d.record.title.clone())
        .unwrap_or_else(|| page.movie_id.clone());

    println!("\n{}", title.bright_cyan().bold());
    let mut table = table();
    if let Some(details) = &page.details {
        let record = &details.record;
        table.add_row(vec![Cell::new("Released"), Cell::new(text_or_dash(details.released.as_deref()))]);
        table.add_row(vec![
            Cell::new("Runtime"),
            Cell::new(record.runtime_minutes.map(|m| format!("{} min", m)).unwrap_or_else(|| "-".into())),
        ]);
        table.add_row(vec![Cell::new("Genres"), Cell::new(record.genre_line())]);
        table.add_row(vec![Cell::new("Director"), Cell::new(text_or_dash(details.director.as_deref()))]);
        table.add_row(vec![Cell::new("Actors"), Cell::new(text_or_dash(details.actors.as_deref()))]);
        table.add_row(vec![Cell::new("IMDb rating"), Cell::new(text_or_dash(details.imdb_rating.as_deref()))]);
    }
    table.add_row(vec![
        Cell::new("Community score").add_attribute(Attribute::Bold),
        Cell::new(format!("{} ({} ratings)", format_score(summary.score), summary.count)),
    ]);
    table.add_row(vec![Cell::new("IMDb id"), Cell::new(&page.movie_id).fg(Color::DarkGrey)]);
    println!("{}", table);

    let plot = plot.or_else(|| page.details.as_ref().and_then(|d| d.plot.as_deref()));
    if let Some(plot) = plot {
        println!("\n{}", plot);
    }

    if summary.count > 0 {
        println!("\n{}", "Score distribution".bold());
        print_distribution(summary);
    }

    println!(
        "\n{} {}",
        "Reviews".bold(),
        format!("({} total)", reviews.total).bright_black()
    );
    if reviews.is_empty() {
        println!("{}", "No reviews on this page.".bright_black());
    }
    for review in reviews.items {
        print_review(review);
    }
    if reviews.has_next() {
        println!("{}", format!("Older reviews: --page {}", reviews.page_index + 1).bright_black());
    }
}

pub fn print_review(review: &ReviewRecord) {
    let date = review
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    println!(
        "  {} {} {}",
        review.author.bold(),
        format!("{}/{}", review.score, Score::MAX).yellow(),
        date.bright_black()
    );
    println!("    {}", review.text);
}

pub fn print_latest(latest: &LatestReview) {
    let title = latest.title.as_deref().unwrap_or(&latest.review.movie_id);
    println!("{} {}", "Latest review:".bright_cyan().bold(), title.bold());
    print_review(&latest.review);
}
