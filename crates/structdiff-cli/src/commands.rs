use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use structdiff_compare::{ChangeDescriptor, Comparator};
use structdiff_format::{render_lines, JsonFormatter, Marker, RenderedDiff, YamlFormatter};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::{Config, OutputFormat};
use crate::input::load_document;

pub const EXIT_SAME: u8 = 0;
pub const EXIT_DIFFERENT: u8 = 1;
pub const EXIT_ERROR: u8 = 2;

/// Result of a successful comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Same,
    Different,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Same => ExitCode::from(EXIT_SAME),
            Self::Different => ExitCode::from(EXIT_DIFFERENT),
        }
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_cli(cli);
    debug!(?config, "effective configuration");

    let old = load_document(&cli.old)?;
    let new = load_document(&cli.new)?;
    let descriptor = Comparator::new(config.compare.clone()).compare(&old, &new);

    let outcome = if descriptor.is_empty() {
        Outcome::Same
    } else {
        Outcome::Different
    };
    info!(?outcome, changes = descriptor.len(), "compared documents");

    let text = if descriptor.is_empty() {
        String::new()
    } else {
        let color = config.color && cli.output.is_none() && io::stdout().is_terminal();
        render(&descriptor, config.format, color)?
    };
    write_output(&text, cli.output.as_deref())?;
    Ok(outcome)
}

/// Render a non-empty descriptor in the requested format.
pub fn render(descriptor: &ChangeDescriptor, format: OutputFormat, color: bool) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Descriptor => {
            return serde_json::to_string_pretty(descriptor).context("cannot serialize descriptor");
        }
        OutputFormat::Json => render_lines(descriptor, &mut JsonFormatter::new())?,
        OutputFormat::Yaml => render_lines(descriptor, &mut YamlFormatter::with_default_emitter()?)?,
    };
    Ok(if color { colorize(&rendered) } else { rendered.to_text() })
}

fn colorize(rendered: &RenderedDiff) -> String {
    rendered
        .lines()
        .iter()
        .map(|(marker, line)| {
            let text = format!("{marker}{line}");
            match marker {
                Marker::Removed => text.red().to_string(),
                Marker::Added => text.green().to_string(),
                Marker::Context => text,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_output(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let body = if text.is_empty() { String::new() } else { format!("{text}\n") };
            fs::write(path, body).with_context(|| format!("cannot write {}", path.display()))
        }
        None if text.is_empty() => Ok(()),
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{text}")?;
            Ok(())
        }
    }
}
