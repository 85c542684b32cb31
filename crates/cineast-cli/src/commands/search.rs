use super::render;
use super::session::{settle, Session};
use super::ui::Spinner;
use crate::output::Output;
use cineast_core::{flows, ActiveCriteria, CriterionTable, Paginator};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

/// Reject unknown ids up front so a typo does not silently filter nothing
fn active_criteria(table: &CriterionTable, ids: &[String]) -> Result<ActiveCriteria> {
    let unknown: Vec<&str> = ids.iter().map(String::as_str).filter(|id| !table.contains(id)).collect();
    if !unknown.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "Unknown filter id(s): {}. Run 'cineast filters' to list them.",
            unknown.join(", ")
        ));
    }
    Ok(ActiveCriteria::from_ids(ids.iter().cloned()))
}

pub async fn run_search(query: &str, filters: &[String], page: usize, output: &Output) -> Result<()> {
    let table = CriterionTable::default();
    let active = active_criteria(&table, filters)?;
    if query.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Search query is empty"));
    }

    let mut session = Session::open()?;
    let page_size = session.config.display.search_page_size;

    let spinner = Spinner::start(output, format!("Searching for \"{}\"...", query.trim()));
    let cancel = session.begin();
    let fetched = settle(flows::search(&mut session.ctx, query, &table, &active, &cancel).await, output)?;
    spinner.finish();

    let degraded = fetched.is_degraded();
    let movies = fetched.data.into_display_order();
    let pages = Paginator::new(&movies, page_size);
    let current = pages.page(page);

    if !output.is_human() {
        output.json(&json!({
            "query": query.trim(),
            "filters": active.active_ids().collect::<Vec<_>>(),
            "page": current,
            "errors": fetched.errors,
        }));
        return Ok(());
    }

    if movies.is_empty() {
        if degraded {
            output.error("Search failed.");
        } else {
            output.info(format!("No movies found for \"{}\".", query.trim()));
        }
        return Ok(());
    }
    if current.is_empty() {
        output.warn(format!("Page {} is out of range (1-{}).", page, pages.page_count()));
        return Ok(());
    }
    render::print_search_page(&current, query.trim());
    Ok(())
}

pub fn run_filters(output: &Output) -> Result<()> {
    let table = CriterionTable::default();

    if !output.is_human() {
        let entries: Vec<_> = table
            .iter()
            .map(|(id, criterion)| json!({ "id": id, "criterion": criterion }))
            .collect();
        output.json(&json!({ "filters": entries }));
        return Ok(());
    }

    let mut listing = Table::new();
    listing.load_preset(comfy_table::presets::UTF8_FULL);
    listing.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    listing.set_header(vec![
        Cell::new("Filter id").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Matches").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for (id, criterion) in table.iter() {
        listing.add_row(vec![Cell::new(id), Cell::new(criterion.to_string())]);
    }
    println!("{}", listing);
    output.println(format!(
        "{}",
        "A movie must match every filter given, so two decades together match nothing.".bright_black()
    ));
    Ok(())
}

pub async fn run_suggest(prefix: &str, search: bool, output: &Output) -> Result<()> {
    let mut session = Session::open()?;
    let cancel = session.begin();

    let suggestions: Vec<(String, String)> = if search {
        let limit = session.config.display.search_suggestion_limit;
        let fetched = settle(flows::search_suggestions(&mut session.ctx, prefix, limit, &cancel).await, output)?;
        fetched.data.into_iter().map(|m| (m.id, m.title)).collect()
    } else {
        let limit = session.config.display.suggestion_limit;
        let spinner = Spinner::start(output, "Loading titles...");
        let fetched = settle(flows::suggest(&mut session.ctx, prefix, limit, &cancel).await, output)?;
        spinner.finish();
        fetched.data.into_iter().map(|e| (e.id, e.title)).collect()
    };

    if !output.is_human() {
        let entries: Vec<_> = suggestions
            .iter()
            .map(|(id, title)| json!({ "id": id, "title": title }))
            .collect();
        output.json(&json!({ "prefix": prefix, "suggestions": entries }));
        return Ok(());
    }

    if suggestions.is_empty() {
        output.info("No suggestions.");
        return Ok(());
    }
    for (id, title) in &suggestions {
        let entry = cineast_core::TitleEntry::new(id.as_str(), title.as_str());
        let (typed, rest) = entry.split_match(prefix);
        let typed = if entry.matches(prefix) { typed.bold().to_string() } else { typed.to_string() };
        println!("{}{}  {}", typed, rest, id.bright_black());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_filter_ids_are_rejected() {
        let table = CriterionTable::default();
        assert!(active_criteria(&table, &["genre-action".to_string()]).is_ok());

        let err = active_criteria(&table, &["genre-western".to_string()]).unwrap_err();
        assert!(err.to_string().contains("genre-western"));
    }
}
