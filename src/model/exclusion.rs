//! Exclusion Sets
//!
//! Field names that must never be promoted into nested models. A name may be
//! qualified as `scope#field`, which only applies to `field` inside the nested
//! type promoted from `scope`.

use super::key::normalize_key;
use std::collections::BTreeSet;

/// Separator between scope and field in a qualified exclusion
pub const SCOPE_SEPARATOR: char = '#';

/// Immutable set of excluded field names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// Build a set from declared names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Union of this set with a parent set
    pub fn merged_with(&self, parent: &ExclusionSet) -> Self {
        Self {
            names: self.names.union(&parent.names).cloned().collect(),
        }
    }

    /// Check whether a normalized field name is excluded
    ///
    /// Qualified entries never match here; they only take effect through
    /// [`ExclusionSet::scoped_to`].
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Field names carried into a nested type promoted under `logical_name`
    ///
    /// Only qualified entries whose scope names the same field as
    /// `logical_name` contribute, and only their trailing field part,
    /// normalized.
    pub fn scoped_to(&self, logical_name: &str) -> Vec<String> {
        let scope = normalize_key(logical_name);
        self.names
            .iter()
            .filter_map(|name| name.split_once(SCOPE_SEPARATOR))
            .filter(|(entry_scope, field)| !field.is_empty() && normalize_key(entry_scope) == scope)
            .map(|(_, field)| normalize_key(field))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
