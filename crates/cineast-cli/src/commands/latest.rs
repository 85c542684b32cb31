use super::render;
use super::session::{settle, Session};
use crate::output::Output;
use cineast_core::flows;
use color_eyre::Result;
use std::time::Duration;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_secs(3);

pub async fn run_latest(follow: bool, output: &Output) -> Result<()> {
    let mut session = Session::open()?;

    if !follow {
        let cancel = session.begin();
        let fetched = settle(flows::latest_review(&mut session.ctx, &cancel).await, output)?;
        if !output.is_human() {
            output.data(&fetched);
            return Ok(());
        }
        match &fetched.data {
            Some(latest) => render::print_latest(latest),
            None => output.info("No reviews yet."),
        }
        return Ok(());
    }

    info!("Following latest reviews every {:?}", POLL_INTERVAL);
    output.println("Following the latest review; Ctrl-C to stop.");

    let mut updates = flows::follow_latest(session.ctx.clone(), POLL_INTERVAL, session.shutdown());
    let mut last_shown = None;
    while let Some(fetched) = updates.recv().await {
        if !output.is_human() {
            output.data(&fetched);
            continue;
        }
        for error in &fetched.errors {
            output.warn(format!("Poll failed, {}", error));
        }
        let Some(latest) = fetched.data else {
            continue;
        };
        // Only print when the latest review changes
        let key = (latest.review.movie_id.clone(), latest.review.author.clone(), latest.review.date);
        if last_shown.as_ref() != Some(&key) {
            println!();
            render::print_latest(&latest);
            last_shown = Some(key);
        }
    }
    Ok(())
}
