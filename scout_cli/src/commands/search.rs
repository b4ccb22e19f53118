use crate::cli::{Cli, TimeArg};
use crate::commands::{spinner, Result, Session};
use crate::output::{format_output, OutputData};
use scout_core::ResearchOptions;
use tracing::info;

/// Web search across every configured search provider.
pub async fn run(
    cli: &Cli,
    query: &str,
    limit: Option<usize>,
    time: Option<TimeArg>,
    no_images: bool,
) -> Result<()> {
    let session = Session::open(cli)?;
    let limit = limit.unwrap_or(session.settings.max_search_results);
    let options = ResearchOptions {
        time_filter: time.map(Into::into),
        include_images: !no_images,
        ..ResearchOptions::default()
    };

    let progress = spinner(cli, format!("Searching for '{}'...", query));
    let response = session.orchestrator.search(query, &options, limit).await;
    progress.finish_and_clear();

    info!(
        hits = response.hits.len(),
        partial = response.meta.partial,
        cached = response.meta.cached,
        "search complete"
    );
    format_output(&OutputData::SearchResults(response), &cli.output)
}

pub async fn run_images(cli: &Cli, query: &str, limit: usize) -> Result<()> {
    let session = Session::open(cli)?;

    let progress = spinner(cli, format!("Finding images for '{}'...", query));
    let response = session.orchestrator.search_images(query, limit).await;
    progress.finish_and_clear();

    format_output(&OutputData::Images(response), &cli.output)
}
