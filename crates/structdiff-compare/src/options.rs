//! Options controlling which keys take part in a comparison.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use structdiff_types::DiffKey;

/// Key filtering applied to every level of a comparison.
///
/// A mapping key passes when `include` is empty or names it, and `exclude`
/// does not name it. Sequence positions are never named by either set: they
/// pass only while `include` is empty. The anonymous root key always passes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Keys ignored when comparing.
    pub exclude: BTreeSet<String>,
    /// If non-empty, only these keys are considered.
    pub include: BTreeSet<String>,
    /// Drop every `added` bucket from the result.
    pub ignore_appended: bool,
}

impl CompareOptions {
    /// Options that keep every change.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add keys to the exclusion set.
    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Add keys to the inclusion set.
    pub fn include<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Set whether additions are dropped from the result.
    pub fn ignore_appended(mut self, ignore: bool) -> Self {
        self.ignore_appended = ignore;
        self
    }

    /// Returns `true` if no key can ever be filtered out.
    pub fn is_unfiltered(&self) -> bool {
        self.exclude.is_empty() && self.include.is_empty() && !self.ignore_appended
    }

    /// Does this key pass the include/exclude test on its own?
    pub fn key_passes(&self, key: &DiffKey) -> bool {
        match key {
            DiffKey::Anonymous => true,
            DiffKey::Index(_) => self.include.is_empty(),
            DiffKey::Name(name) => {
                (self.include.is_empty() || self.include.contains(name))
                    && !self.exclude.contains(name)
            }
        }
    }
}
