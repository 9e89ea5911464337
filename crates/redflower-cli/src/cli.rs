use std::ffi::OsStr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use redflower_config::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid log format '{other}', expected one of: human, json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file with defaults")]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InputArgs {
    #[arg(long, value_name = "CSV", help = "Recognition event table")]
    pub events: PathBuf,

    #[arg(long, value_name = "CSV", help = "Employee roster table")]
    pub roster: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for output artifacts (defaults to [output].directory under the workspace)"
    )]
    pub out_dir: Option<PathBuf>,

    #[arg(long, help = "Minimum count for the narrative (overrides [narrative].min_count)")]
    pub min_count: Option<u32>,

    #[arg(
        long,
        value_parser = parse_output_format,
        help = "Artifact format: csv or json (overrides [output].format)"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        long,
        default_value_t = 10,
        help = "Number of top recipients to print after the run"
    )]
    pub preview: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Write the default .redflower/config.toml
    Init(InitArgs),
    /// Check that both tables carry the required columns
    Validate(InputArgs),
    /// Run the full analysis and write every artifact
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Red flower recognition analysis")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Workspace root holding .redflower/config.toml"
    )]
    pub workspace: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = parse_log_format,
        help = "Log format: human or json"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

pub fn parse_cli() -> Cli {
    let mut args: Vec<_> = std::env::args_os().collect();
    if args.get(1).is_some_and(|arg| arg == OsStr::new("--")) {
        args.remove(1);
    }

    Cli::parse_from(args)
}

fn parse_output_format(value: &str) -> Result<OutputFormat, String> {
    value.parse()
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse()
}
