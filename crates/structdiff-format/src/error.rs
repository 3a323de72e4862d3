//! Error types for the format crate.

/// Errors that abort a render.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The descriptor breaks the shape the comparator produces.
    #[error("malformed change descriptor: {reason}: {fragment}")]
    MalformedDescriptor {
        /// What was wrong.
        reason: String,
        /// The offending descriptor in its serialized form.
        fragment: String,
    },

    /// The formatter needs a capability this build does not provide.
    #[error("{0} output is not supported: no emitter available")]
    UnsupportedFormat(&'static str),

    /// A leaf value could not be written out.
    #[error("failed to emit value: {0}")]
    Emit(String),
}

/// Convenience alias for render results.
pub type FormatResult<T> = Result<T, FormatError>;
