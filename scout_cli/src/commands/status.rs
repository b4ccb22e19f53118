use crate::cli::{Cli, OutputFormat};
use crate::commands::{Result, Session};
use crate::output::{format_output, paint, OutputData, Tone};
use scout_core::Capabilities;

pub async fn run(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let caps = Capabilities::detect(&session.registry);
    format_output(&OutputData::Status(caps), &cli.output)
}

pub async fn providers(cli: &Cli) -> Result<()> {
    let session = Session::open(cli)?;
    let descriptors = session.registry.list_providers();
    format_output(&OutputData::Providers(descriptors), &cli.output)?;

    if cli.output == OutputFormat::Pretty {
        println!(
            "{} Set provider API keys in the environment, then run {}",
            paint("Tip:", Tone::Good),
            paint("scout status", Tone::Accent)
        );
    }
    Ok(())
}

/// Shown when no command is given.
pub async fn overview(cli: &Cli) -> Result<()> {
    if cli.output != OutputFormat::Pretty {
        return run(cli).await;
    }
    let session = Session::open(cli)?;
    let caps = Capabilities::detect(&session.registry);

    println!();
    println!(
        "{}  {}",
        paint("Scout", Tone::Heading),
        paint("- multi-provider research CLI", Tone::Dim)
    );
    println!();
    println!(
        "  {} providers registered, cache {}",
        paint(session.registry.len(), Tone::Good),
        if session.settings.enable_cache {
            paint("on", Tone::Good)
        } else {
            paint("off", Tone::Warn)
        }
    );
    if !caps.ai_summarization {
        println!(
            "  {}",
            paint("No AI provider configured: summaries use local analysis", Tone::Warn)
        );
    }
    println!();

    println!("{}", paint("Quick Start:", Tone::Heading));
    for (command, help) in [
        ("scout search \"query\"", "Search the web"),
        ("scout summarize \"topic\" --file F", "Summarize a document"),
        ("scout report \"query\"", "Search and write a report"),
        ("scout status", "Show available capabilities"),
    ] {
        println!("  {:<36}{}", paint(command, Tone::Accent), paint(help, Tone::Dim));
    }
    println!();
    println!(
        "{} Use {} for full help",
        paint("Tip:", Tone::Dim),
        paint("scout --help", Tone::Accent)
    );
    println!();
    Ok(())
}
