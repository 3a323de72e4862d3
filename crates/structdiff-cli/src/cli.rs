use std::path::PathBuf;

use clap::Parser;

use crate::config::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "structdiff",
    about = "Structural comparison of two JSON or YAML documents",
    version,
)]
pub struct Cli {
    /// The old document
    pub old: PathBuf,
    /// The new document
    pub new: PathBuf,

    /// Key ignored when comparing (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "KEY")]
    pub exclude: Vec<String>,

    /// Key exclusively used when comparing (repeatable)
    #[arg(short = 'i', long = "include", value_name = "KEY")]
    pub include: Vec<String>,

    /// Ignore appended keys and array elements
    #[arg(short = 'a', long = "ignore-append")]
    pub ignore_append: bool,

    /// Write the result to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output a YAML diff (same as --format yaml)
    #[arg(short = 'Y', long, conflicts_with = "format")]
    pub yaml: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Never colour the output
    #[arg(long)]
    pub no_color: bool,

    #[arg(short, long)]
    pub verbose: bool,
}
