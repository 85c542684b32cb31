use super::prompts;
use super::render;
use super::session::{settle, Session};
use super::ui::{is_interactive, Spinner};
use crate::output::Output;
use chrono::{Local, Utc};
use cineast_config::FlagStore;
use cineast_core::submission::{ensure_unrated, submit_rating, submit_review};
use cineast_core::{flows, FlowError, RatingReceipt, RatingState, ReviewDraft};
use cineast_models::{Score, MAX_REVIEW_CHARS};
use color_eyre::Result;
use serde_json::json;

fn flow_failure(error: FlowError) -> color_eyre::Report {
    match error {
        FlowError::Validation(e) => color_eyre::eyre::eyre!("Invalid review: {}", e),
        FlowError::StateConflict { movie_id, until } => color_eyre::eyre::eyre!(
            "{} was already rated from this machine; it unlocks at {}",
            movie_id,
            until.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        FlowError::Network(e) => color_eyre::eyre::eyre!("The ratings service did not accept the submission: {}", e),
        FlowError::Cancelled(_) => color_eyre::eyre::eyre!("Interrupted"),
    }
}

/// Refuse before asking the user anything
fn refuse_if_rated(flags: &FlagStore, movie_id: &str) -> Result<()> {
    ensure_unrated(flags, movie_id, Utc::now()).map_err(flow_failure)
}

fn report_receipt(receipt: &RatingReceipt, what: &str, output: &Output) {
    if !output.is_human() {
        output.data(receipt);
        return;
    }
    output.success(format!("{} saved for {}", what, receipt.movie_id));
    if let Some(fresh) = &receipt.refreshed {
        output.info(format!(
            "Community score is now {} from {} ratings",
            render::format_score(fresh.summary.score),
            fresh.summary.count
        ));
    }
}

pub async fn run_movie(id: Option<&str>, full_plot: bool, page: usize, output: &Output) -> Result<()> {
    let mut session = Session::open()?;

    let spinner = Spinner::start(output, "Loading movie...");
    let cancel = session.begin();
    let fetched = settle(flows::movie_page(&mut session.ctx, id, &cancel).await, output)?;
    let Some(movie) = fetched.data else {
        spinner.finish();
        return Err(color_eyre::eyre::eyre!("No movie given and no top rated movie to fall back to"));
    };

    let plot = if full_plot {
        spinner.set_message("Loading full plot...");
        settle(flows::full_plot(&mut session.ctx, &movie.movie_id, &cancel).await, output)?.data
    } else {
        None
    };
    spinner.finish();

    let state = RatingState::of(&session.flags, &movie.movie_id, Utc::now());
    let reviews = movie.reviews(session.config.display.review_page_size);
    let reviews_page = reviews.page(page);

    if !output.is_human() {
        output.json(&json!({
            "movie": movie,
            "full_plot": plot,
            "reviews": reviews_page,
            "rating_state": state,
            "errors": fetched.errors,
        }));
        return Ok(());
    }

    render::print_movie_page(&movie, &reviews_page, plot.as_deref());
    match state {
        RatingState::Rated(score) => output.println(format!("\nYou rated this movie {}/{}.", score, Score::MAX)),
        RatingState::Unrated => output.println(format!(
            "\nRate it: cineast rate {} <1-4>   Review it: cineast review {}",
            movie.movie_id, movie.movie_id
        )),
    }
    Ok(())
}

pub async fn run_rate(id: &str, score: u8, yes: bool, output: &Output) -> Result<()> {
    let score = Score::new(score)?;
    let mut session = Session::open()?;

    refuse_if_rated(&session.flags, id)?;

    if !yes {
        if !is_interactive() {
            return Err(color_eyre::eyre::eyre!("Refusing to rate without confirmation; pass --yes"));
        }
        if !prompts::prompt_yes_no(&format!("Give {} a score of {}?", id, score), Some(true))? {
            output.info("Rating cancelled.");
            return Ok(());
        }
    }

    let ttl = session.config.flags.reviewed_ttl();
    let spinner = Spinner::start(output, "Submitting rating...");
    let cancel = session.begin();
    let result = submit_rating(session.ctx.ratings(), &mut session.flags, id, score, ttl, &cancel).await;
    spinner.finish();

    let receipt = result.map_err(flow_failure)?;
    session.persist_flags(output)?;
    report_receipt(&receipt, "Rating", output);
    Ok(())
}

pub async fn run_review(
    id: &str,
    name: Option<String>,
    score: Option<u8>,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = Session::open()?;

    refuse_if_rated(&session.flags, id)?;

    let interactive = is_interactive() && output.is_human();
    let mut draft = ReviewDraft::new(id);
    draft.reviewer = match name {
        Some(name) => name,
        None if interactive => prompts::prompt_string("Your name", None)?,
        None => String::new(),
    };
    draft.text = match text {
        Some(text) => text,
        None if interactive => prompts::prompt_string(&format!("Review (max {} characters)", MAX_REVIEW_CHARS), None)?,
        None => String::new(),
    };
    draft.score = match score {
        Some(score) => Some(score),
        None if interactive => Some(prompts::prompt_score("Score (1-4)")?),
        None => None,
    };

    let ttl = session.config.flags.reviewed_ttl();
    let spinner = Spinner::start(output, "Posting review...");
    let cancel = session.begin();
    let result = submit_review(session.ctx.ratings(), &mut session.flags, &draft, ttl, &cancel).await;
    spinner.finish();

    let receipt = result.map_err(flow_failure)?;
    session.persist_flags(output)?;
    report_receipt(&receipt, "Review", output);
    Ok(())
}
