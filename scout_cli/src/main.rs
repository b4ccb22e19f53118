use clap::Parser;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;
use output::{paint_stderr, Tone};

fn default_filter(verbose: u8) -> &'static str {
    // core logs under "scout.<component>" targets
    match verbose {
        0 => "scout_cli=info,scout=warn",
        1 => "scout_cli=debug,scout=info",
        _ => "scout_cli=trace,scout=debug",
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let result = match &cli.command {
        None => status::overview(&cli).await,
        Some(Commands::Summarize {
            query,
            file,
            text,
            speed,
            summary_type,
            best_of,
            detailed_formatting,
            tables,
            bullets,
            simple,
        }) => {
            let request = summarize::SummarizeArgs {
                query,
                file: file.as_deref(),
                text: text.as_deref(),
                speed: *speed,
                summary_type: *summary_type,
                best_of: *best_of,
                detailed_formatting: *detailed_formatting,
                tables: *tables,
                bullets: *bullets,
                simple: *simple,
            };
            summarize::run(&cli, request).await
        }
        Some(Commands::Search {
            query,
            limit,
            time,
            no_images,
        }) => search::run(&cli, query, *limit, *time, *no_images).await,
        Some(Commands::Images { query, limit }) => search::run_images(&cli, query, *limit).await,
        Some(Commands::Historical { indicator, years }) => {
            historical::run(&cli, indicator, *years).await
        }
        Some(Commands::Report {
            query,
            limit,
            summary_type,
            no_extract,
        }) => report::run(&cli, query, *limit, *summary_type, !*no_extract).await,
        Some(Commands::Providers) => status::providers(&cli).await,
        Some(Commands::Status) => status::run(&cli).await,
        Some(Commands::Cache { action }) => cache::run(&cli, action.clone()).await,
        Some(Commands::Config { action }) => config::run(&cli, action.clone()).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {}", paint_stderr("Error", Tone::Bad), e);
        process::exit(1);
    }
}
