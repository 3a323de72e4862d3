//! Include/exclude filtering of change descriptors.
//!
//! The comparator filters each level right after building it, so nested
//! descriptors are already filtered and pruned when their parent is. A key
//! that fails the include/exclude test is still kept when its nested
//! descriptor holds a descendant key that passes, so a parent survives
//! whenever something below it does.

use structdiff_types::DiffKey;
use tracing::trace;

use crate::descriptor::{Change, ChangeDescriptor};
use crate::options::CompareOptions;

/// Single-level filter. Nested descriptors are assumed to be filtered already.
pub(crate) struct KeyFilter<'a> {
    options: &'a CompareOptions,
}

impl<'a> KeyFilter<'a> {
    pub(crate) fn new(options: &'a CompareOptions) -> Self {
        Self { options }
    }

    /// Drop failing keys from the three change buckets of one descriptor.
    pub(crate) fn apply(&self, mut descriptor: ChangeDescriptor) -> ChangeDescriptor {
        if self.options.is_unfiltered() {
            return descriptor;
        }

        descriptor.removed.retain(|key, _| self.retains(key, None));
        if self.options.ignore_appended {
            descriptor.added.clear();
        } else {
            descriptor.added.retain(|key, _| self.retains(key, None));
        }
        descriptor
            .updated
            .retain(|key, change| self.retains(key, change.as_nested()));

        let ChangeDescriptor {
            updated, original, ..
        } = &mut descriptor;
        original.retain(|key, _| updated.contains_key(key));

        if descriptor.is_empty() {
            return ChangeDescriptor::empty();
        }
        descriptor
    }

    fn retains(&self, key: &DiffKey, nested: Option<&ChangeDescriptor>) -> bool {
        let keep = self.options.key_passes(key)
            || nested.is_some_and(|descriptor| self.has_passing_descendant(descriptor));
        if !keep {
            trace!(key = %key, "filtered out change");
        }
        keep
    }

    /// Does any key below this descriptor pass the include/exclude test?
    pub(crate) fn has_passing_descendant(&self, descriptor: &ChangeDescriptor) -> bool {
        let passes_here = descriptor
            .removed
            .keys()
            .chain(descriptor.added.keys())
            .chain(descriptor.updated.keys())
            .any(|key| self.options.key_passes(key));

        passes_here
            || descriptor
                .updated
                .values()
                .filter_map(Change::as_nested)
                .any(|nested| self.has_passing_descendant(nested))
    }
}
