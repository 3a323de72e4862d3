//! The change descriptor: one node of a structural diff.
//!
//! A descriptor records, for a single mapping or sequence, which keys were
//! removed, which were added, and which were updated. Updated entries either
//! hold a nested descriptor (both sides were comparable composites) or the
//! new leaf value, in which case the old value is mirrored in `original`.
//!
//! The serialized form is a JSON object using reserved keys:
//!
//! ```json
//! {"__type": "array", "__update": {"1": 9}, "__remove": {"2": 3},
//!  "__original": {"1": 2, "__length": 3}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use structdiff_types::DiffKey;

use crate::error::{DescriptorError, DescriptorResult};

/// Type tag key.
pub const KEY_TYPE: &str = "__type";
/// Bucket of entries present only in the old value.
pub const KEY_REMOVE: &str = "__remove";
/// Bucket of entries present only in the new value.
pub const KEY_APPEND: &str = "__append";
/// Bucket of entries present on both sides with different content.
pub const KEY_UPDATE: &str = "__update";
/// Old values of updated entries.
pub const KEY_ORIGINAL: &str = "__original";
/// Old sequence length, stored inside the original bucket of array descriptors.
pub const KEY_LENGTH: &str = "__length";

/// Type tag value for mapping descriptors.
pub const TYPE_OBJECT: &str = "object";
/// Type tag value for sequence descriptors.
pub const TYPE_ARRAY: &str = "array";

/// What a descriptor describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// Changes inside a mapping; keys are names.
    Object,
    /// Changes inside a sequence; keys are positions.
    Array,
    /// Whole-value replacement of two roots that could not be compared structurally.
    #[default]
    None,
}

impl DescriptorKind {
    /// The serialized type tag, absent for [`DescriptorKind::None`].
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::Object => Some(TYPE_OBJECT),
            Self::Array => Some(TYPE_ARRAY),
            Self::None => None,
        }
    }
}

/// An entry of the `updated` bucket.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// Both sides were composites of the same kind; the nested diff follows.
    Nested(ChangeDescriptor),
    /// The leaf value was replaced by this new value.
    Value(Value),
}

impl Change {
    /// The nested descriptor, if this is one.
    pub fn as_nested(&self) -> Option<&ChangeDescriptor> {
        match self {
            Self::Nested(descriptor) => Some(descriptor),
            Self::Value(_) => None,
        }
    }

    /// The new leaf value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Nested(_) => None,
        }
    }
}

/// Structural difference between two values at one level of the tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeDescriptor {
    /// What kind of node this descriptor describes.
    pub kind: DescriptorKind,
    /// Entries present only in the old value.
    pub removed: BTreeMap<DiffKey, Value>,
    /// Entries present only in the new value.
    pub added: BTreeMap<DiffKey, Value>,
    /// Entries present on both sides whose content differs.
    pub updated: BTreeMap<DiffKey, Change>,
    /// Old values, one per entry of `updated`.
    pub original: BTreeMap<DiffKey, Value>,
    /// Length of the old sequence. Only set on non-empty array descriptors.
    pub length: Option<usize>,
}

impl ChangeDescriptor {
    /// Create an empty descriptor of the given kind.
    pub fn new(kind: DescriptorKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// The "no change" descriptor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A whole-value replacement of `old` by `new` under the anonymous key.
    pub fn replacement(old: Value, new: Value) -> Self {
        let mut descriptor = Self::new(DescriptorKind::None);
        descriptor.removed.insert(DiffKey::Anonymous, old);
        descriptor.added.insert(DiffKey::Anonymous, new);
        descriptor
    }

    /// Returns `true` if nothing was removed, added, or updated.
    ///
    /// This is the single answer to "did the two values differ".
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.updated.is_empty()
    }

    /// Number of changed entries at this level.
    pub fn len(&self) -> usize {
        self.removals() + self.additions() + self.updates()
    }

    /// Number of removed entries at this level.
    pub fn removals(&self) -> usize {
        self.removed.len()
    }

    /// Number of added entries at this level.
    pub fn additions(&self) -> usize {
        self.added.len()
    }

    /// Number of updated entries at this level.
    pub fn updates(&self) -> usize {
        self.updated.len()
    }

    /// Serialize into the reserved-key JSON form.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        if self.is_empty() {
            return Value::Object(out);
        }
        if let Some(tag) = self.kind.tag() {
            out.insert(KEY_TYPE.to_string(), Value::String(tag.to_string()));
        }
        if !self.removed.is_empty() {
            out.insert(KEY_REMOVE.to_string(), Value::Object(wire_bucket(&self.removed)));
        }
        if !self.added.is_empty() {
            out.insert(KEY_APPEND.to_string(), Value::Object(wire_bucket(&self.added)));
        }
        if !self.updated.is_empty() {
            let updated = self
                .updated
                .iter()
                .map(|(key, change)| {
                    let value = match change {
                        Change::Nested(descriptor) => descriptor.to_value(),
                        Change::Value(value) => value.clone(),
                    };
                    (key.to_wire(), value)
                })
                .collect();
            out.insert(KEY_UPDATE.to_string(), Value::Object(updated));
        }
        if !self.original.is_empty() || self.length.is_some() {
            let mut original = wire_bucket(&self.original);
            if let Some(length) = self.length {
                original.insert(KEY_LENGTH.to_string(), Value::from(length));
            }
            out.insert(KEY_ORIGINAL.to_string(), Value::Object(original));
        }
        Value::Object(out)
    }

    /// Read a descriptor back from its reserved-key JSON form.
    pub fn from_value(value: &Value) -> DescriptorResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| DescriptorError::NotAnObject(value.to_string()))?;

        let kind = match obj.get(KEY_TYPE) {
            None => DescriptorKind::None,
            Some(Value::String(tag)) if tag == TYPE_OBJECT => DescriptorKind::Object,
            Some(Value::String(tag)) if tag == TYPE_ARRAY => DescriptorKind::Array,
            Some(other) => return Err(DescriptorError::UnknownType(other.to_string())),
        };

        let mut descriptor = Self::new(kind);

        if let Some(bucket) = bucket(obj, KEY_REMOVE)? {
            for (wire, value) in bucket {
                descriptor.removed.insert(parse_key(kind, wire)?, value.clone());
            }
        }
        if let Some(bucket) = bucket(obj, KEY_APPEND)? {
            for (wire, value) in bucket {
                descriptor.added.insert(parse_key(kind, wire)?, value.clone());
            }
        }
        if let Some(bucket) = bucket(obj, KEY_UPDATE)? {
            for (wire, value) in bucket {
                let change = if is_descriptor_value(value) {
                    Change::Nested(Self::from_value(value)?)
                } else {
                    Change::Value(value.clone())
                };
                descriptor.updated.insert(parse_key(kind, wire)?, change);
            }
        }
        if let Some(bucket) = bucket(obj, KEY_ORIGINAL)? {
            for (wire, value) in bucket {
                if kind == DescriptorKind::Array && wire == KEY_LENGTH {
                    let length = value
                        .as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| DescriptorError::InvalidLength(value.to_string()))?;
                    descriptor.length = Some(length);
                } else {
                    descriptor.original.insert(parse_key(kind, wire)?, value.clone());
                }
            }
        }

        Ok(descriptor)
    }
}

/// Returns `true` if a serialized value is itself a change descriptor.
pub fn is_descriptor_value(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        [KEY_REMOVE, KEY_APPEND, KEY_UPDATE, KEY_ORIGINAL]
            .iter()
            .any(|key| obj.contains_key(*key))
    })
}

impl Serialize for ChangeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChangeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn wire_bucket(bucket: &BTreeMap<DiffKey, Value>) -> Map<String, Value> {
    bucket
        .iter()
        .map(|(key, value)| (key.to_wire(), value.clone()))
        .collect()
}

fn bucket<'a>(
    obj: &'a Map<String, Value>,
    name: &'static str,
) -> DescriptorResult<Option<&'a Map<String, Value>>> {
    match obj.get(name) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(DescriptorError::InvalidBucket(name)),
    }
}

fn parse_key(kind: DescriptorKind, wire: &str) -> DescriptorResult<DiffKey> {
    match kind {
        DescriptorKind::Array => wire
            .parse::<usize>()
            .map(DiffKey::Index)
            .map_err(|_| DescriptorError::InvalidIndex(wire.to_string())),
        DescriptorKind::Object => Ok(DiffKey::Name(wire.to_string())),
        DescriptorKind::None if wire.is_empty() => Ok(DiffKey::Anonymous),
        DescriptorKind::None => Ok(DiffKey::Name(wire.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn array_descriptor() -> ChangeDescriptor {
        let mut d = ChangeDescriptor::new(DescriptorKind::Array);
        d.updated.insert(DiffKey::Index(1), Change::Value(json!(9)));
        d.original.insert(DiffKey::Index(1), json!(2));
        d.removed.insert(DiffKey::Index(2), json!(3));
        d.length = Some(3);
        d
    }

    #[test]
    fn empty_descriptor_serializes_as_empty_object() {
        let d = ChangeDescriptor::new(DescriptorKind::Object);
        assert!(d.is_empty());
        assert_eq!(d.to_value(), json!({}));
        assert_eq!(ChangeDescriptor::empty().len(), 0);
    }

    #[test]
    fn array_descriptor_wire_form() {
        assert_eq!(
            array_descriptor().to_value(),
            json!({
                "__type": "array",
                "__remove": {"2": 3},
                "__update": {"1": 9},
                "__original": {"1": 2, "__length": 3}
            })
        );
    }

    #[test]
    fn append_only_array_keeps_length_in_original() {
        let mut d = ChangeDescriptor::new(DescriptorKind::Array);
        d.added.insert(DiffKey::Index(3), json!(4));
        d.length = Some(3);
        assert_eq!(
            d.to_value(),
            json!({
                "__type": "array",
                "__append": {"3": 4},
                "__original": {"__length": 3}
            })
        );
    }

    #[test]
    fn replacement_has_no_type_tag() {
        let d = ChangeDescriptor::replacement(json!(1), json!("one"));
        assert_eq!(d.kind, DescriptorKind::None);
        assert_eq!(
            d.to_value(),
            json!({"__remove": {"": 1}, "__append": {"": "one"}})
        );
    }

    #[test]
    fn nested_descriptor_survives_serde() {
        let mut inner = ChangeDescriptor::new(DescriptorKind::Object);
        inner.added.insert("port".into(), json!(8080));
        let mut outer = ChangeDescriptor::new(DescriptorKind::Object);
        outer.updated.insert("server".into(), Change::Nested(inner));
        outer.original.insert("server".into(), json!({"host": "a"}));

        let text = serde_json::to_string(&outer).unwrap();
        let back: ChangeDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(back, outer);
    }

    #[test]
    fn array_descriptor_survives_serde() {
        let d = array_descriptor();
        let back = ChangeDescriptor::from_value(&d.to_value()).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.length, Some(3));
    }

    #[test]
    fn replacement_reads_back_as_anonymous() {
        let d = ChangeDescriptor::from_value(&json!({"__remove": {"": 1}, "__append": {"": 2}}))
            .unwrap();
        assert_eq!(d, ChangeDescriptor::replacement(json!(1), json!(2)));
    }

    #[test]
    fn leaf_object_in_update_is_not_a_descriptor() {
        let d = ChangeDescriptor::from_value(&json!({
            "__type": "object",
            "__update": {"cfg": {"debug": true}},
            "__original": {"cfg": [1]}
        }))
        .unwrap();
        assert_eq!(d.updated[&DiffKey::from("cfg")], Change::Value(json!({"debug": true})));
    }

    #[test]
    fn length_key_is_a_plain_key_in_objects() {
        let d = ChangeDescriptor::from_value(&json!({
            "__type": "object",
            "__update": {"__length": 2},
            "__original": {"__length": 1}
        }))
        .unwrap();
        assert_eq!(d.length, None);
        assert_eq!(d.original[&DiffKey::from("__length")], json!(1));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            ChangeDescriptor::from_value(&json!([1])),
            Err(DescriptorError::NotAnObject(_))
        ));
        assert!(matches!(
            ChangeDescriptor::from_value(&json!({"__type": "set"})),
            Err(DescriptorError::UnknownType(_))
        ));
        assert!(matches!(
            ChangeDescriptor::from_value(&json!({"__type": "array", "__append": {"x": 1}})),
            Err(DescriptorError::InvalidIndex(_))
        ));
        assert!(matches!(
            ChangeDescriptor::from_value(&json!({"__type": "object", "__remove": [1]})),
            Err(DescriptorError::InvalidBucket(KEY_REMOVE))
        ));
        assert!(matches!(
            ChangeDescriptor::from_value(&json!({
                "__type": "array",
                "__append": {"0": 1},
                "__original": {"__length": -1}
            })),
            Err(DescriptorError::InvalidLength(_))
        ));
    }

    #[test]
    fn counts() {
        let d = array_descriptor();
        assert_eq!(d.removals(), 1);
        assert_eq!(d.additions(), 0);
        assert_eq!(d.updates(), 1);
        assert_eq!(d.len(), 2);
    }
}
