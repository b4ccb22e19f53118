pub mod cache;
pub mod config;
pub mod historical;
pub mod report;
pub mod search;
pub mod status;
pub mod summarize;

use crate::cli::{Cli, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use scout_core::cache::CacheError;
use scout_core::config::SettingsError;
use scout_core::error::ProviderError;
use scout_core::{CacheLayer, FallbackOrchestrator, ProviderRegistry, Settings};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Core library error: {0}")]
    Core(#[from] ProviderError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Settings, providers and the orchestrator for one invocation.
pub struct Session {
    pub settings: Settings,
    pub registry: Arc<ProviderRegistry>,
    pub orchestrator: FallbackOrchestrator,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self> {
        let mut settings = Settings::load()?;
        if cli.no_cache {
            settings.enable_cache = false;
        }
        let registry = Arc::new(ProviderRegistry::from_env(&settings)?);
        debug!(
            providers = registry.len(),
            cache = settings.enable_cache,
            "session ready"
        );
        let orchestrator = FallbackOrchestrator::new(registry.clone(), settings.clone())
            .with_cache(CacheLayer::disk(&settings));
        Ok(Self {
            settings,
            registry,
            orchestrator,
        })
    }
}

/// Spinner on stderr for pretty output; hidden otherwise so piped
/// JSON/YAML stays clean.
pub fn spinner(cli: &Cli, message: String) -> ProgressBar {
    if cli.output != OutputFormat::Pretty {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
