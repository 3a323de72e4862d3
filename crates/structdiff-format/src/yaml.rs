//! YAML-style diff output.
//!
//! Every line starts with its marker column, followed by YAML indented by
//! two columns per level:
//!
//! ```text
//!  server:
//! -  port: 80
//! +  port: 8080
//!    hosts:
//!      ...
//! +    - b.example
//! ```
//!
//! Composite leaf values are dumped through a [`YamlEmitter`] supplied at
//! construction, so a build without YAML support fails before rendering
//! starts rather than halfway through.

use serde_json::Value;
use structdiff_types::DiffKey;

use crate::error::{FormatError, FormatResult};
use crate::part::{Marker, Part, Sink, ELISION};
use crate::walk::Formatter;

/// Block scalar indicator for multi-line strings.
const BLOCK: &str = "|-";

/// Dumps composite values as YAML documents.
pub trait YamlEmitter: Send + Sync {
    /// Serialize a value as block-style YAML.
    fn dump(&self, value: &Value) -> FormatResult<String>;
}

/// [`YamlEmitter`] backed by `serde_yaml`.
#[cfg(feature = "yaml")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeYamlEmitter;

#[cfg(feature = "yaml")]
impl YamlEmitter for SerdeYamlEmitter {
    fn dump(&self, value: &Value) -> FormatResult<String> {
        serde_yaml::to_string(value).map_err(|e| FormatError::Emit(e.to_string()))
    }
}

/// The emitter this build provides, if any.
pub fn default_emitter() -> Option<Box<dyn YamlEmitter>> {
    #[cfg(feature = "yaml")]
    {
        Some(Box::new(SerdeYamlEmitter))
    }
    #[cfg(not(feature = "yaml"))]
    {
        None
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    /// Column of this node's entries.
    col: usize,
    /// The node is a sequence item whose dash is merged into its first line.
    item: bool,
}

/// Renders change descriptors as a YAML-like diff.
pub struct YamlFormatter {
    emitter: Box<dyn YamlEmitter>,
    frames: Vec<Frame>,
    /// Sequence-item dashes waiting for the next written line.
    pending_items: usize,
    pending_col: usize,
    /// Column of line-diff content while inside one.
    text_col: Option<usize>,
}

impl YamlFormatter {
    /// Create a formatter using the given emitter.
    ///
    /// Fails with [`FormatError::UnsupportedFormat`] when no emitter is given.
    pub fn new(emitter: Option<Box<dyn YamlEmitter>>) -> FormatResult<Self> {
        let emitter = emitter.ok_or(FormatError::UnsupportedFormat("yaml"))?;
        Ok(Self {
            emitter,
            frames: Vec::new(),
            pending_items: 0,
            pending_col: 0,
            text_col: None,
        })
    }

    /// Create a formatter with the emitter this build provides.
    pub fn with_default_emitter() -> FormatResult<Self> {
        Self::new(default_emitter())
    }

    fn col(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.col)
    }

    fn write(&mut self, sink: &mut dyn Sink, marker: Marker, col: usize, text: &str) {
        let line = if self.pending_items > 0 {
            let dashes = "- ".repeat(self.pending_items);
            self.pending_items = 0;
            format!("{}{dashes}{text}", " ".repeat(self.pending_col))
        } else {
            format!("{}{text}", " ".repeat(col))
        };
        sink.emit(marker, &line);
    }

    fn begin(&mut self, sink: &mut dyn Sink, key: Option<&DiffKey>) {
        let col = self.col();
        match key {
            Some(DiffKey::Name(name)) => {
                self.write(sink, Marker::Context, col, &format!("{name}:"));
                self.frames.push(Frame {
                    col: col + 2,
                    item: false,
                });
            }
            Some(DiffKey::Index(_)) => {
                if self.pending_items == 0 {
                    self.pending_col = col;
                }
                self.pending_items += 1;
                self.frames.push(Frame {
                    col: col + 2,
                    item: true,
                });
            }
            Some(DiffKey::Anonymous) | None => self.frames.push(Frame { col, item: false }),
        }
    }

    fn end(&mut self) {
        if let Some(frame) = self.frames.pop() {
            if frame.item && self.pending_items > 0 {
                self.pending_items -= 1;
            }
        }
    }

    fn leaf(
        &mut self,
        sink: &mut dyn Sink,
        marker: Marker,
        value: &Value,
        key: Option<&DiffKey>,
    ) -> FormatResult<()> {
        let col = self.col();
        let lead = match key {
            Some(DiffKey::Name(name)) => format!("{name}:"),
            Some(DiffKey::Index(_)) => "-".to_string(),
            Some(DiffKey::Anonymous) | None => String::new(),
        };

        match value {
            Value::String(text) if text.contains('\n') => {
                self.write(sink, marker, col, &join_lead(&lead, BLOCK));
                for line in text.lines() {
                    self.write(sink, marker, col + 2, line);
                }
            }
            Value::Array(_) | Value::Object(_) => {
                let dump = self.emitter.dump(value)?;
                let lines: Vec<&str> = dump.trim_end().lines().collect();
                match (key, lines.as_slice()) {
                    (_, [single]) => self.write(sink, marker, col, &join_lead(&lead, single)),
                    (Some(DiffKey::Index(_)), [first, rest @ ..]) => {
                        self.write(sink, marker, col, &join_lead(&lead, first));
                        for line in rest {
                            self.write(sink, marker, col + 2, line);
                        }
                    }
                    (Some(DiffKey::Name(_)), _) => {
                        self.write(sink, marker, col, &lead);
                        for line in &lines {
                            self.write(sink, marker, col + 2, line);
                        }
                    }
                    _ => {
                        for line in &lines {
                            self.write(sink, marker, col, line);
                        }
                    }
                }
            }
            scalar => self.write(sink, marker, col, &join_lead(&lead, &scalar_text(scalar))),
        }
        Ok(())
    }

    fn text_begin(&mut self, sink: &mut dyn Sink, key: Option<&DiffKey>) {
        let col = self.col();
        match key {
            Some(DiffKey::Name(name)) => {
                self.write(sink, Marker::Context, col, &format!("{name}: {BLOCK}"));
                self.text_col = Some(col + 2);
            }
            Some(DiffKey::Index(_)) => {
                self.write(sink, Marker::Context, col, &format!("- {BLOCK}"));
                self.text_col = Some(col + 2);
            }
            Some(DiffKey::Anonymous) | None => self.text_col = Some(col),
        }
    }
}

impl Formatter for YamlFormatter {
    fn output(
        &mut self,
        sink: &mut dyn Sink,
        marker: Marker,
        part: Part<'_>,
        key: Option<&DiffKey>,
        _depth: usize,
    ) -> FormatResult<()> {
        match part {
            Part::ObjectBegin | Part::ArrayBegin => self.begin(sink, key),
            Part::ObjectEnd | Part::ArrayEnd => self.end(),
            Part::Elision => {
                let col = self.text_col.unwrap_or_else(|| self.col());
                self.write(sink, Marker::Context, col, ELISION);
            }
            Part::Leaf(value) => self.leaf(sink, marker, value, key)?,
            Part::TextBegin => self.text_begin(sink, key),
            Part::TextLine(line) => {
                let col = self.text_col.unwrap_or_else(|| self.col());
                self.write(sink, marker, col, line);
            }
            Part::TextEnd => self.text_col = None,
        }
        Ok(())
    }

    fn supports_text_diff(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.frames.clear();
        self.pending_items = 0;
        self.pending_col = 0;
        self.text_col = None;
    }
}

fn join_lead(lead: &str, text: &str) -> String {
    if lead.is_empty() {
        text.to_string()
    } else {
        format!("{lead} {text}")
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
