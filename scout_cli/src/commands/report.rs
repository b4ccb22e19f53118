use crate::cli::{Cli, SummaryTypeArg};
use crate::commands::{spinner, Result, Session};
use crate::output::{format_output, OutputData};
use scout_core::report::{ResearchReport, SourceDocument};
use scout_core::{ContentExtractor, ResearchOptions};
use tracing::info;

/// Search, fetch the text hits' pages and write a cited report. With
/// `extract` off, or for pages that cannot be read, the snippets stand in.
pub async fn run(
    cli: &Cli,
    query: &str,
    limit: Option<usize>,
    summary_type: SummaryTypeArg,
    extract: bool,
) -> Result<()> {
    let session = Session::open(cli)?;
    let limit = limit.unwrap_or(session.settings.max_search_results);
    let options = ResearchOptions {
        include_images: false,
        ..ResearchOptions::default()
    };

    let progress = spinner(cli, format!("Searching for '{}'...", query));
    let response = session.orchestrator.search(query, &options, limit).await;

    let mut documents: Vec<SourceDocument> = response.text_hits().map(SourceDocument::from).collect();
    if extract && !documents.is_empty() {
        progress.set_message(format!("Reading {} pages...", documents.len()));
        let mut extractor = ContentExtractor::new(&session.settings)?;
        if let Some(cache) = session.orchestrator.cache() {
            extractor = extractor.with_cache(cache.clone());
        }
        documents = extractor.enrich(documents).await;
    }
    info!(sources = documents.len(), extract, "building report");

    progress.set_message(format!("Writing report from {} sources...", documents.len()));
    let report =
        ResearchReport::build(&session.orchestrator, &documents, query, summary_type.into()).await;
    progress.finish_and_clear();

    format_output(&OutputData::Report(report), &cli.output)
}
