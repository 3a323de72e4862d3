//! Structural comparison engine for structdiff.
//!
//! Compares two tree values and produces a [`ChangeDescriptor`]: a canonical
//! summary of what was removed, added, and updated at every level, with the
//! old values kept alongside updates so formatters can show before and after.
//!
//! # Key Types
//!
//! - [`Comparator`] / [`CompareOptions`] -- Recursive comparison with key filtering
//! - [`ChangeDescriptor`] / [`Change`] -- The diff tree and its reserved-key wire form
//! - [`LineDiff`] / [`TextHunk`] / [`DiffLine`] -- Line-level diff of multi-line text values

pub mod comparator;
pub mod descriptor;
pub mod error;
mod filter;
pub mod options;
pub mod text_diff;

pub use comparator::{compare, Comparator};
pub use descriptor::{
    Change, ChangeDescriptor, DescriptorKind, KEY_APPEND, KEY_LENGTH, KEY_ORIGINAL, KEY_REMOVE,
    KEY_TYPE, KEY_UPDATE, TYPE_ARRAY, TYPE_OBJECT,
};
pub use error::{DescriptorError, DescriptorResult};
pub use options::CompareOptions;
pub use text_diff::{diff_text, DiffLine, LineDiff, TextHunk};
