//! JSON-style diff output.
//!
//! Changed mappings and sequences are bracketed and indented; every leaf is
//! written as a compact JSON literal behind its marker column:
//!
//! ```text
//!  {
//! -  port: 80
//! +  port: 8080
//!    hosts: [
//!      ...
//! +    "b.example"
//!    ]
//!  }
//! ```

use serde_json::Value;
use structdiff_types::DiffKey;

use crate::error::{FormatError, FormatResult};
use crate::part::{Marker, Part, Sink, ELISION};
use crate::walk::Formatter;

/// Spaces per nesting level.
pub const DEFAULT_INDENT: usize = 2;

/// Renders change descriptors as a bracketed JSON-like diff.
#[derive(Clone, Debug)]
pub struct JsonFormatter {
    indent: usize,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

impl JsonFormatter {
    /// Create a formatter with the default indentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter indenting each level by `indent` spaces.
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }
}

impl Formatter for JsonFormatter {
    fn output(
        &mut self,
        sink: &mut dyn Sink,
        marker: Marker,
        part: Part<'_>,
        key: Option<&DiffKey>,
        depth: usize,
    ) -> FormatResult<()> {
        let indent = " ".repeat(self.indent * depth);
        let prefix = key
            .and_then(DiffKey::as_name)
            .map(|name| format!("{name}: "))
            .unwrap_or_default();

        let line = match part {
            Part::ObjectBegin => format!("{indent}{prefix}{{"),
            Part::ObjectEnd => format!("{indent}}}"),
            Part::ArrayBegin => format!("{indent}{prefix}["),
            Part::ArrayEnd => format!("{indent}]"),
            Part::Elision => format!("{indent}{ELISION}"),
            Part::Leaf(value) => format!("{indent}{prefix}{}", literal(value)?),
            Part::TextLine(text) => format!("{indent}{}", literal(&Value::from(text))?),
            Part::TextBegin | Part::TextEnd => return Ok(()),
        };
        sink.emit(marker, &line);
        Ok(())
    }
}

fn literal(value: &Value) -> FormatResult<String> {
    serde_json::to_string(value).map_err(|e| FormatError::Emit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_json_diff;
    use crate::walk::render_lines;
    use serde_json::json;
    use structdiff_compare::{compare, ChangeDescriptor, CompareOptions};

    fn json_diff(old: Value, new: Value) -> String {
        render_json_diff(&compare(&old, &new, &CompareOptions::new())).unwrap()
    }

    #[test]
    fn no_change_renders_nothing() {
        assert_eq!(json_diff(json!({"a": 1}), json!({"a": 1})), "");
    }

    #[test]
    fn scalar_update_in_mapping() {
        assert_eq!(
            json_diff(json!({"a": 1}), json!({"a": 2})),
            " {\n-  a: 1\n+  a: 2\n }"
        );
    }

    #[test]
    fn removed_and_added_keys() {
        assert_eq!(
            json_diff(json!({"gone": "x", "same": 1}), json!({"new": [1, 2], "same": 1})),
            " {\n-  gone: \"x\"\n+  new: [1,2]\n }"
        );
    }

    #[test]
    fn nested_containers() {
        assert_eq!(
            json_diff(
                json!({"server": {"hosts": ["a", "b", "c"], "port": 80}}),
                json!({"server": {"hosts": ["a", "b", "c", "d"], "port": 80}})
            ),
            [
                " {",
                "   server: {",
                "     hosts: [",
                "       ...",
                "+      \"d\"",
                "     ]",
                "   }",
                " }",
            ]
            .join("\n")
        );
    }

    #[test]
    fn shortened_array() {
        assert_eq!(
            json_diff(json!([1, 2, 3]), json!([1, 9])),
            " [\n   ...\n-  2\n+  9\n-  3\n ]"
        );
    }

    #[test]
    fn mapping_inside_array_has_no_key_prefix() {
        assert_eq!(
            json_diff(json!([{"a": true}]), json!([{"a": false}])),
            " [\n   {\n-    a: true\n+    a: false\n   }\n ]"
        );
    }

    #[test]
    fn multiline_strings_are_replaced_whole() {
        assert_eq!(
            json_diff(json!({"t": "a\nb"}), json!({"t": "a\nc"})),
            " {\n-  t: \"a\\nb\"\n+  t: \"a\\nc\"\n }"
        );
    }

    #[test]
    fn root_replacement_has_no_brackets() {
        assert_eq!(json_diff(json!(null), json!([1])), "-null\n+[1]");
    }

    #[test]
    fn custom_indent() {
        let d = compare(&json!({"a": 1}), &json!({"a": 2}), &CompareOptions::new());
        let mut formatter = JsonFormatter::with_indent(4);
        let out = render_lines(&d, &mut formatter).unwrap();
        assert_eq!(out.lines()[1], (Marker::Removed, "    a: 1".to_string()));
    }

    #[test]
    fn malformed_descriptor_is_reported() {
        let d: ChangeDescriptor =
            serde_json::from_value(json!({"__remove": {"": 1}, "__update": {"x": 2}})).unwrap();
        assert!(matches!(
            render_json_diff(&d),
            Err(FormatError::MalformedDescriptor { .. })
        ));
    }
}
