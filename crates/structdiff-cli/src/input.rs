use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, warn};

/// Read a document, parsed by extension.
///
/// `.yaml` and `.yml` files are read as YAML, anything else as JSON. Content
/// that fails to parse is compared as a single text value.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(parse_document(path, text))
}

pub fn parse_document(path: &Path, text: String) -> Value {
    let parsed = if is_yaml(path) {
        serde_yaml::from_str::<Value>(&text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())
    };
    match parsed {
        Ok(value) => {
            debug!(path = %path.display(), "parsed document");
            value
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "not a structured document, comparing as text");
            Value::String(text)
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
