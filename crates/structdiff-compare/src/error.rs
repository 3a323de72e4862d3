//! Error types for the compare crate.

/// Errors raised when reading a change descriptor from its serialized form.
///
/// The comparator itself is total over tree values and never fails.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The serialized descriptor is not a JSON object.
    #[error("change descriptor must be an object, got {0}")]
    NotAnObject(String),

    /// The `__type` tag holds an unknown value.
    #[error("unknown change descriptor type: {0}")]
    UnknownType(String),

    /// A change bucket is not a JSON object.
    #[error("change bucket {0} must be an object")]
    InvalidBucket(&'static str),

    /// An array descriptor carries a key that is not a position.
    #[error("array change key {0:?} is not a non-negative integer")]
    InvalidIndex(String),

    /// The recorded original array length is not a non-negative integer.
    #[error("original array length must be a non-negative integer, got {0}")]
    InvalidLength(String),
}

/// Convenience alias for descriptor decoding results.
pub type DescriptorResult<T> = Result<T, DescriptorError>;
