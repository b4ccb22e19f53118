use crate::cli::Cli;
use crate::commands::{spinner, CommandError, Result, Session};
use crate::output::{format_output, OutputData};

pub async fn run(cli: &Cli, indicator: &str, years: u32) -> Result<()> {
    if indicator.trim().is_empty() {
        return Err(CommandError::InvalidInput(
            "Indicator name is empty".to_string(),
        ));
    }
    let session = Session::open(cli)?;

    let progress = spinner(cli, format!("Fetching {} series...", indicator));
    let series = session.orchestrator.fetch_series(indicator.trim(), years).await;
    progress.finish_and_clear();

    let analysis = series.analysis();
    format_output(&OutputData::Series { series, analysis }, &cli.output)
}
