//! Keys of change entries.

use std::fmt;

/// The key a change entry is recorded under.
///
/// Mapping changes are keyed by name, sequence changes by position. The
/// anonymous key stands for the whole value when the two roots cannot be
/// compared structurally; it is kept apart from the name space so an empty
/// mapping key never collides with it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiffKey {
    /// Whole-value replacement at the root.
    Anonymous,
    /// Position in a sequence.
    Index(usize),
    /// Key of a mapping entry.
    Name(String),
}

impl DiffKey {
    /// The mapping key, if this is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// The sequence position, if this is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Returns `true` for the anonymous root key.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// String form used when the key is written out as a JSON object key.
    pub fn to_wire(&self) -> String {
        match self {
            Self::Anonymous => String::new(),
            Self::Index(idx) => idx.to_string(),
            Self::Name(name) => name.clone(),
        }
    }
}

impl fmt::Display for DiffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => Ok(()),
            Self::Index(idx) => write!(f, "{idx}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for DiffKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for DiffKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for DiffKey {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}
