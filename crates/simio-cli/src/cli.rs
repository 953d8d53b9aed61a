use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "simio - inspect and convert structured-record simulation files between text, native and portable binary encodings.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// I/O settings in TOML format (precision, debug, backups, offset limit)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the file type, encoding and size of one or more files.
    Inspect(InspectArgs),
    /// Copy a record layout from one file into another, converting its encoding.
    Convert(ConvertArgs),
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Files to inspect.
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// File to read items from.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// File to write items to. An existing portable-binary file is backed up first.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Comma-separated item layout, e.g. 'string,int:2,step,nrvec:100'.
    #[arg(short, long, required = true, value_name = "LAYOUT")]
    pub items: String,

    /// Treat the input as this file type (extension such as 'trr' or 'gro').
    #[arg(long, value_name = "EXT")]
    pub input_type: Option<String>,

    /// Treat the output as this file type (extension such as 'trr' or 'gro').
    #[arg(long, value_name = "EXT")]
    pub output_type: Option<String>,

    /// Annotate text output with item descriptions.
    #[arg(long)]
    pub annotate: bool,
}
