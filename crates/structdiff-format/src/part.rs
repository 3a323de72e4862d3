//! Structural parts, line markers, and line sinks.

use std::fmt;

use serde_json::Value;

/// Text of the elision marker for unchanged, unprinted spans.
pub const ELISION: &str = "...";

/// Leading column of every rendered line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Present only on the old side.
    Removed,
    /// Present only on the new side.
    Added,
    /// Structure or unchanged context.
    Context,
}

impl Marker {
    /// The marker character: `-`, `+` or a space.
    pub fn as_char(self) -> char {
        match self {
            Self::Removed => '-',
            Self::Added => '+',
            Self::Context => ' ',
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One step of the walk over a change descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Part<'a> {
    /// A changed mapping starts.
    ObjectBegin,
    /// A changed mapping ends.
    ObjectEnd,
    /// A changed sequence starts.
    ArrayBegin,
    /// A changed sequence ends.
    ArrayEnd,
    /// Unchanged entries or lines were skipped.
    Elision,
    /// A removed, added, or replaced value.
    Leaf(&'a Value),
    /// A line diff of a multi-line string starts.
    TextBegin,
    /// One line of a line diff; the marker tells its side.
    TextLine(&'a str),
    /// A line diff ends.
    TextEnd,
}

/// Receives rendered lines.
pub trait Sink {
    /// Accept one line with its marker.
    fn emit(&mut self, marker: Marker, line: &str);
}

impl<F: FnMut(Marker, &str)> Sink for F {
    fn emit(&mut self, marker: Marker, line: &str) {
        self(marker, line)
    }
}

/// A complete render: marked lines in output order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedDiff {
    lines: Vec<(Marker, String)>,
}

impl RenderedDiff {
    /// Create an empty render.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing was rendered.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The lines with their markers.
    pub fn lines(&self) -> &[(Marker, String)] {
        &self.lines
    }

    /// Forward every line to another sink.
    pub fn replay(&self, sink: &mut dyn Sink) {
        for (marker, line) in &self.lines {
            sink.emit(*marker, line);
        }
    }

    /// Join the lines, each prefixed by its marker, without a trailing newline.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|(marker, line)| format!("{}{line}", marker.as_char()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Sink for RenderedDiff {
    fn emit(&mut self, marker: Marker, line: &str) {
        self.lines.push((marker, line.to_string()));
    }
}

impl fmt::Display for RenderedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
