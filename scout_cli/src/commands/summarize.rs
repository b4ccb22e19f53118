use crate::cli::{Cli, SpeedArg, SummaryTypeArg};
use crate::commands::{spinner, CommandError, Result, Session};
use crate::output::{format_output, OutputData};
use scout_core::ResearchOptions;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

pub struct SummarizeArgs<'a> {
    pub query: &'a str,
    pub file: Option<&'a Path>,
    pub text: Option<&'a str>,
    pub speed: SpeedArg,
    pub summary_type: SummaryTypeArg,
    pub best_of: bool,
    pub detailed_formatting: bool,
    pub tables: bool,
    pub bullets: bool,
    pub simple: bool,
}

impl SummarizeArgs<'_> {
    fn options(&self) -> ResearchOptions {
        ResearchOptions {
            search_speed: self.speed.into(),
            detailed_formatting: self.detailed_formatting,
            include_tables: self.tables,
            include_bullet_points: self.bullets,
            summary_type: self.summary_type.into(),
            ..ResearchOptions::default()
        }
    }
}

fn read_input(args: &SummarizeArgs<'_>) -> Result<String> {
    if let Some(text) = args.text {
        return Ok(text.to_string());
    }
    if let Some(path) = args.file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(CommandError::InvalidInput(
            "Nothing to summarize. Pass --file, --text or pipe text on stdin".to_string(),
        ));
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(buffer)
}

pub async fn run(cli: &Cli, args: SummarizeArgs<'_>) -> Result<()> {
    let text = read_input(&args)?;
    let session = Session::open(cli)?;
    let options = (!args.simple).then(|| args.options());

    let progress = spinner(cli, format!("Summarizing '{}'...", args.query));
    let summary = if args.best_of {
        session
            .orchestrator
            .summarize_best_of(&text, args.query, options.as_ref())
            .await
    } else {
        session
            .orchestrator
            .summarize(&text, args.query, options.as_ref())
            .await
    };
    progress.finish_and_clear();

    let data = OutputData::Summary {
        query: args.query.to_string(),
        summary,
    };
    format_output(&data, &cli.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{SearchSpeed, SummaryType};

    fn args() -> SummarizeArgs<'static> {
        SummarizeArgs {
            query: "solar",
            file: None,
            text: Some("inline text"),
            speed: SpeedArg::Quick,
            summary_type: SummaryTypeArg::Brief,
            best_of: false,
            detailed_formatting: true,
            tables: false,
            bullets: true,
            simple: false,
        }
    }

    #[test]
    fn test_options_from_flags() {
        let options = args().options();
        assert_eq!(options.search_speed, SearchSpeed::Quick);
        assert_eq!(options.summary_type, SummaryType::Brief);
        assert!(options.detailed_formatting);
        assert!(!options.include_tables);
        assert!(options.include_bullet_points);
    }

    #[test]
    fn test_inline_text_wins() {
        assert_eq!(read_input(&args()).unwrap(), "inline text");
    }
}
