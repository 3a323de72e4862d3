//! Text rendering of structdiff change descriptors.
//!
//! A single depth-first walk ([`render`]) turns a [`ChangeDescriptor`] into a
//! stream of structural [`Part`]s. Each [`Formatter`] only translates parts
//! into marked lines; the walk itself is shared.
//!
//! # Key Types
//!
//! - [`Formatter`] / [`Part`] / [`Marker`] -- The walk and its pluggable renderers
//! - [`JsonFormatter`] -- Bracketed, indented diff
//! - [`YamlFormatter`] / [`YamlEmitter`] -- YAML-like diff with line diffs for text values
//! - [`RenderedDiff`] -- Ordered `(marker, line)` output

pub mod error;
pub mod json;
pub mod part;
pub mod walk;
pub mod yaml;

pub use error::{FormatError, FormatResult};
pub use json::JsonFormatter;
pub use part::{Marker, Part, RenderedDiff, Sink, ELISION};
pub use walk::{render, render_lines, Formatter, TEXT_CONTEXT};
pub use yaml::{default_emitter, YamlEmitter, YamlFormatter};

#[cfg(feature = "yaml")]
pub use yaml::SerdeYamlEmitter;

use structdiff_compare::ChangeDescriptor;

/// Render a descriptor as a JSON-style diff.
pub fn render_json_diff(descriptor: &ChangeDescriptor) -> FormatResult<String> {
    let mut formatter = JsonFormatter::new();
    Ok(render_lines(descriptor, &mut formatter)?.to_text())
}

/// Render a descriptor as a YAML-style diff.
///
/// Fails with [`FormatError::UnsupportedFormat`] when built without the
/// `yaml` feature.
pub fn render_yaml_diff(descriptor: &ChangeDescriptor) -> FormatResult<String> {
    let mut formatter = YamlFormatter::with_default_emitter()?;
    Ok(render_lines(descriptor, &mut formatter)?.to_text())
}
