use super::render;
use super::session::{settle, Session};
use super::ui::Spinner;
use crate::output::Output;
use cineast_core::flows;
use color_eyre::Result;
use serde_json::json;

pub async fn run_toplist(worst: bool, page: u32, more: bool, output: &Output) -> Result<()> {
    let mut session = Session::open()?;
    let display = session.config.display.clone();
    let page = page.max(1);
    let last_page = if more { display.toplist_max_pages.max(page) } else { page };

    let spinner = Spinner::start(output, "Loading top list...");
    let mut movies = Vec::new();
    let mut errors = Vec::new();
    for current in page..=last_page {
        spinner.set_message(format!("Loading page {}...", current));
        let query = display.toplist_query(worst, current);
        let cancel = session.begin();
        let fetched = settle(flows::toplist(&mut session.ctx, &query, &cancel).await, output)?;
        let exhausted = fetched.data.len() < query.limit as usize;
        movies.extend(fetched.data);
        errors.extend(fetched.errors);
        if exhausted {
            break;
        }
    }
    spinner.finish();

    let list = if worst { "worst" } else { "top" };
    if !output.is_human() {
        output.json(&json!({
            "list": list,
            "movies": movies,
            "errors": errors,
        }));
        return Ok(());
    }

    if movies.is_empty() {
        if errors.is_empty() {
            output.info("No movies have enough ratings to be listed yet.");
        } else {
            output.error("Could not load the list.");
        }
        return Ok(());
    }

    let title = if worst { "Worst rated movies" } else { "Top rated movies" };
    render::print_toplist(&movies, title);
    if !more && page < display.toplist_max_pages {
        output.println(format!("Show more: --more (pages {}-{})", page, display.toplist_max_pages));
    }
    Ok(())
}
