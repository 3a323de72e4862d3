//! The recursive comparator.
//!
//! Mappings are compared key by key, sequences position by position, and
//! scalars by value. The tree is walked post-order: nested descriptors are
//! built and filtered before their parent, and empty ones are never stored.

use serde_json::{Map, Value};
use structdiff_types::{scalar_eq, values_equal, DiffKey, TypeTag};
use tracing::debug;

use crate::descriptor::{Change, ChangeDescriptor, DescriptorKind};
use crate::filter::KeyFilter;
use crate::options::CompareOptions;

/// Compare two values with the given options.
pub fn compare(old: &Value, new: &Value, options: &CompareOptions) -> ChangeDescriptor {
    Comparator::new(options.clone()).compare(old, new)
}

/// Produces change descriptors for pairs of tree values.
#[derive(Clone, Debug, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    /// Create a comparator with the given options.
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// The options this comparator filters with.
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two values.
    ///
    /// Two mappings or two sequences are compared structurally. Any other
    /// pair that differs is reported as a replacement of the whole value
    /// under the anonymous key.
    pub fn compare(&self, old: &Value, new: &Value) -> ChangeDescriptor {
        let result = match (old, new) {
            (Value::Object(old_map), Value::Object(new_map)) => {
                self.compare_mappings(old_map, new_map)
            }
            (Value::Array(old_seq), Value::Array(new_seq)) => {
                self.compare_sequences(old_seq, new_seq)
            }
            _ if values_equal(old, new) => ChangeDescriptor::empty(),
            _ => ChangeDescriptor::replacement(old.clone(), new.clone()),
        };

        debug!(
            kind = ?result.kind,
            removed = result.removals(),
            added = result.additions(),
            updated = result.updates(),
            "comparison finished"
        );
        result
    }

    /// Compare two values found under the same key. `None` means no change.
    fn compare_elements(&self, old: &Value, new: &Value) -> Option<Change> {
        match (old, new) {
            (Value::Object(old_map), Value::Object(new_map)) => {
                non_empty(self.compare_mappings(old_map, new_map))
            }
            _ if TypeTag::of(old) != TypeTag::of(new) => Some(Change::Value(new.clone())),
            (Value::Array(old_seq), Value::Array(new_seq)) => {
                non_empty(self.compare_sequences(old_seq, new_seq))
            }
            _ if scalar_eq(old, new) => None,
            _ => Some(Change::Value(new.clone())),
        }
    }

    fn compare_mappings(&self, old: &Map<String, Value>, new: &Map<String, Value>) -> ChangeDescriptor {
        let mut result = ChangeDescriptor::new(DescriptorKind::Object);

        for (key, old_value) in old {
            match new.get(key) {
                Some(new_value) => {
                    if let Some(change) = self.compare_elements(old_value, new_value) {
                        result.updated.insert(DiffKey::from(key.as_str()), change);
                        result
                            .original
                            .insert(DiffKey::from(key.as_str()), old_value.clone());
                    }
                }
                None => {
                    result
                        .removed
                        .insert(DiffKey::from(key.as_str()), old_value.clone());
                }
            }
        }

        for (key, new_value) in new {
            if !old.contains_key(key) {
                result
                    .added
                    .insert(DiffKey::from(key.as_str()), new_value.clone());
            }
        }

        KeyFilter::new(&self.options).apply(result)
    }

    fn compare_sequences(&self, old: &[Value], new: &[Value]) -> ChangeDescriptor {
        let mut result = ChangeDescriptor::new(DescriptorKind::Array);
        let common = old.len().min(new.len());

        for (idx, (old_value, new_value)) in old.iter().zip(new).enumerate() {
            if let Some(change) = self.compare_elements(old_value, new_value) {
                result.updated.insert(DiffKey::Index(idx), change);
                result.original.insert(DiffKey::Index(idx), old_value.clone());
            }
        }

        // Only one side can have a remainder.
        for (idx, value) in new.iter().enumerate().skip(common) {
            result.added.insert(DiffKey::Index(idx), value.clone());
        }
        for (idx, value) in old.iter().enumerate().skip(common) {
            result.removed.insert(DiffKey::Index(idx), value.clone());
        }

        let mut result = KeyFilter::new(&self.options).apply(result);
        if !result.is_empty() {
            result.length = Some(old.len());
        }
        result
    }
}

fn non_empty(descriptor: ChangeDescriptor) -> Option<Change> {
    if descriptor.is_empty() {
        None
    } else {
        Some(Change::Nested(descriptor))
    }
}
