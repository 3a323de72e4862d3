//! Value model for structdiff.
//!
//! Tree values are plain [`serde_json::Value`]s as produced by any JSON-like
//! decoder. This crate classifies them and defines the equality rules the
//! comparator relies on.
//!
//! # Key Types
//!
//! - [`ValueKind`] -- Mapping, Sequence or Scalar
//! - [`TypeTag`] -- Concrete type identity used to detect type changes
//! - [`DiffKey`] -- Key of a change entry (mapping key, array index, or the anonymous root key)

pub mod key;
pub mod value;

pub use key::DiffKey;
pub use value::{is_multiline_string, scalar_eq, values_equal, TypeTag, ValueKind};

pub use serde_json::{Map, Value};
