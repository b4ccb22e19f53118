use crate::cli::{CacheAction, Cli};
use crate::commands::Result;
use crate::output::{format_output, OutputData};
use scout_core::{CacheLayer, Settings};
use tracing::info;

pub async fn run(cli: &Cli, action: CacheAction) -> Result<()> {
    // cache maintenance ignores enable_cache and --no-cache
    let settings = Settings::load()?;
    let cache = CacheLayer::disk(&settings);

    match action {
        CacheAction::Stats => {
            let stats = cache.stats().await?;
            format_output(&OutputData::CacheStats(stats), &cli.output)
        }
        CacheAction::Clear { kind } => {
            let removed = cache.clear(kind).await?;
            info!(removed, kind = ?kind, "cache cleared");
            format_output(&OutputData::CacheCleared { kind, removed }, &cli.output)
        }
    }
}
