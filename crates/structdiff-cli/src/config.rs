use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use structdiff_compare::CompareOptions;

use crate::cli::Cli;

/// What the command writes on a difference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The change descriptor as pretty-printed JSON.
    #[default]
    Descriptor,
    /// A JSON-style diff.
    Json,
    /// A YAML-style diff.
    Yaml,
}

/// Settings read from a TOML file, then overridden by flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: OutputFormat,
    pub color: bool,
    pub compare: CompareOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Descriptor,
            color: true,
            compare: CompareOptions::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Filter keys from flags extend the file's; switches override it.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        self.compare.exclude.extend(cli.exclude.iter().cloned());
        self.compare.include.extend(cli.include.iter().cloned());
        if cli.ignore_append {
            self.compare.ignore_appended = true;
        }
        if cli.yaml {
            self.format = OutputFormat::Yaml;
        } else if let Some(format) = cli.format {
            self.format = format;
        }
        if cli.no_color {
            self.color = false;
        }
        self
    }
}
