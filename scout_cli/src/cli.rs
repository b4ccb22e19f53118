use clap::{Parser, Subcommand, ValueEnum};
use scout_core::{CacheKind, SearchSpeed, SummaryType, TimeFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Scout - research across AI, search and data providers")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  scout status                              What is configured
  scout search \"solar storage\"              Web search across providers
  scout summarize \"solar\" --file notes.txt  Summarize a document
  scout report \"grid batteries\"             Search, then write a report

\x1b[1;36mConfiguration:\x1b[0m
  scout config init                         Write a settings file with defaults
  scout config show                         Settings and detected credentials
  scout providers                           Registered providers by capability")]
#[command(long_about = "
\x1b[1mScout\x1b[0m - multi-provider research CLI

Providers are tried in priority order. When every AI provider fails, a local
text analyser writes the summary instead, so commands always produce output.
Credentials are read from environment variables (OPENAI_API_KEY, EXA_API_KEY, ...).
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Bypass the on-disk cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize text with the first AI provider that answers
    ///
    /// Reads the text from --file, --text or stdin.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  scout summarize \"battery recycling\" --file article.txt
  scout summarize \"rust async\" --text \"...\" --speed quick
  scout summarize \"fusion\" --file notes.md --type comprehensive --best-of")]
    Summarize {
        /// Topic the summary should focus on
        query: String,
        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Text to summarize
        #[arg(short, long)]
        text: Option<String>,
        #[arg(long, value_enum, default_value_t = SpeedArg::Advanced)]
        speed: SpeedArg,
        #[arg(long = "type", value_enum, default_value_t = SummaryTypeArg::Detailed)]
        summary_type: SummaryTypeArg,
        /// Ask every provider and keep the best answer
        #[arg(long)]
        best_of: bool,
        /// Wrap the answer in headings, key points and a table
        #[arg(long)]
        detailed_formatting: bool,
        /// Ask for tables in the summary
        #[arg(long)]
        tables: bool,
        /// Ask for bullet points in the summary
        #[arg(long)]
        bullets: bool,
        /// Ignore options and use the plain summary prompt
        #[arg(long, conflicts_with_all = ["best_of", "detailed_formatting"])]
        simple: bool,
    },

    /// Search the web across every configured search provider
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  scout search \"perovskite solar\"
  scout search \"rust 2024 edition\" --limit 5 --time month
  scout search \"mars rover\" --no-images --output json")]
    Search {
        query: String,
        /// Maximum number of text results
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only results from the last day, week, month or year
        #[arg(long, value_enum)]
        time: Option<TimeArg>,
        /// Leave images out of the results
        #[arg(long)]
        no_images: bool,
    },

    /// Search for images
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  scout images \"mountain lake\" --limit 6")]
    Images {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Quarterly series for an economic indicator
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  scout historical GDP --years 10
  scout historical unemployment")]
    Historical {
        /// Indicator name, e.g. GDP, unemployment, inflation
        indicator: String,
        #[arg(short, long, default_value_t = 5)]
        years: u32,
    },

    /// Search, then build a cited research report from the results
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  scout report \"grid scale batteries\"
  scout report \"crispr therapies\" --type brief --output markdown
  scout report \"heat pumps\" --no-extract")]
    Report {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long = "type", value_enum, default_value_t = SummaryTypeArg::Comprehensive)]
        summary_type: SummaryTypeArg,
        /// Write the report from search snippets without fetching the pages
        #[arg(long)]
        no_extract: bool,
    },

    /// Registered providers per capability, in the order they are tried
    #[command(alias = "ls")]
    Providers,

    /// Capabilities available with the current credentials and tools
    Status,

    /// Inspect or clear the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum CacheAction {
    /// File counts and sizes per cache kind
    Stats,
    /// Remove cached entries (all kinds when none is given)
    Clear {
        /// search, content, summaries or images
        kind: Option<CacheKind>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Effective settings and detected credentials
    Show,
    /// Path of the settings file
    Path,
    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
    /// Markdown output
    Markdown,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SpeedArg {
    Quick,
    Advanced,
}

impl From<SpeedArg> for SearchSpeed {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Quick => SearchSpeed::Quick,
            SpeedArg::Advanced => SearchSpeed::Advanced,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SummaryTypeArg {
    Brief,
    Detailed,
    Comprehensive,
}

impl From<SummaryTypeArg> for SummaryType {
    fn from(arg: SummaryTypeArg) -> Self {
        match arg {
            SummaryTypeArg::Brief => SummaryType::Brief,
            SummaryTypeArg::Detailed => SummaryType::Detailed,
            SummaryTypeArg::Comprehensive => SummaryType::Comprehensive,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TimeArg {
    Day,
    Week,
    Month,
    Year,
}

impl From<TimeArg> for TimeFilter {
    fn from(arg: TimeArg) -> Self {
        match arg {
            TimeArg::Day => TimeFilter::Day,
            TimeArg::Week => TimeFilter::Week,
            TimeArg::Month => TimeFilter::Month,
            TimeArg::Year => TimeFilter::Year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summarize() {
        let cli = Cli::parse_from([
            "scout", "summarize", "solar", "--text", "body", "--type", "comprehensive", "--best-of",
        ]);
        match cli.command {
            Some(Commands::Summarize {
                query,
                summary_type,
                best_of,
                ..
            }) => {
                assert_eq!(query, "solar");
                assert_eq!(SummaryType::from(summary_type), SummaryType::Comprehensive);
                assert!(best_of);
            }
            _ => panic!("expected summarize"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["scout", "status", "--output", "json", "-vv", "--no-cache"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_cache);
    }

    #[test]
    fn test_parse_report() {
        let cli = Cli::parse_from(["scout", "report", "heat pumps", "--type", "brief", "--no-extract"]);
        match cli.command {
            Some(Commands::Report {
                query,
                summary_type,
                no_extract,
                ..
            }) => {
                assert_eq!(query, "heat pumps");
                assert_eq!(SummaryType::from(summary_type), SummaryType::Brief);
                assert!(no_extract);
            }
            _ => panic!("expected report"),
        }
    }
}
