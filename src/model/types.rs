//! Model Types
//!
//! A [`ModelType`] is a named, schema-less class of models. Types form a
//! single-parent hierarchy: exclusions, derived attributes, hash-path
//! accessors, leniency and shape policy are inherited from the parent.
//! Types are immutable once built; everything is declared through
//! [`ModelTypeBuilder`].

use super::derived::{DerivedAttr, HashPath};
use super::exclusion::ExclusionSet;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// What promotion does when a reused nested type meets unknown fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePolicy {
    /// Fail with `ShapeMismatch`
    #[default]
    Strict,
    /// Add the new fields to the existing type's accessor table
    Extend,
}

/// Link from a type to the type it extends
enum ParentLink {
    /// Declared supertype, kept alive by its subtypes
    Declared(Arc<ModelType>),
    /// Owner of a synthesized nested type; the owner's registry holds the
    /// nested type, so this side stays weak
    Owner(Weak<ModelType>),
}

/// A named model type
pub struct ModelType {
    name: String,
    parent: Option<ParentLink>,
    own_exclusions: ExclusionSet,
    /// own ∪ parent's, computed on first use
    exclusions: OnceLock<ExclusionSet>,
    derived: Vec<DerivedAttr>,
    hash_paths: Vec<HashPath>,
    lenient: bool,
    shape_policy: ShapePolicy,
    /// Fixed accessor table of synthesized nested types; `None` for open types
    pub(super) accessors: Option<RwLock<BTreeSet<String>>>,
    /// Nested types synthesized under this type, by logical name
    pub(super) nested: Mutex<HashMap<String, Arc<ModelType>>>,
}

impl ModelType {
    /// Start defining a new type
    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type this one extends
    ///
    /// A synthesized nested type answers `None` once its owner is dropped.
    pub fn parent(&self) -> Option<Arc<ModelType>> {
        match self.parent.as_ref()? {
            ParentLink::Declared(parent) => Some(Arc::clone(parent)),
            ParentLink::Owner(owner) => owner.upgrade(),
        }
    }

    /// Exclusions declared on this type itself
    pub fn own_exclusions(&self) -> &ExclusionSet {
        &self.own_exclusions
    }

    /// Own exclusions merged with every ancestor's, memoized
    pub fn exclusion_set(&self) -> &ExclusionSet {
        self.exclusions.get_or_init(|| match self.parent() {
            Some(parent) => self.own_exclusions.merged_with(parent.exclusion_set()),
            None => self.own_exclusions.clone(),
        })
    }

    /// Check whether a normalized field name must stay unpromoted
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusion_set().contains(name)
    }

    /// Derived attributes, inherited ones included
    pub fn derived_attrs(&self) -> &[DerivedAttr] {
        &self.derived
    }

    pub fn derived_attr(&self, name: &str) -> Option<&DerivedAttr> {
        self.derived.iter().find(|attr| attr.name() == name)
    }

    /// Hash-path accessors, inherited ones included
    pub fn hash_paths(&self) -> &[HashPath] {
        &self.hash_paths
    }

    pub fn hash_path(&self, name: &str) -> Option<&HashPath> {
        self.hash_paths.iter().find(|path| path.name == name)
    }

    /// Whether reads of unknown fields return null instead of failing
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    pub fn shape_policy(&self) -> ShapePolicy {
        self.shape_policy
    }

    /// Check whether the type's accessor table covers a normalized field
    ///
    /// Open types have no table and answer `false`; their instances expose
    /// whatever fields their own payload carried.
    pub fn has_accessor(&self, field: &str) -> bool {
        self.accessors
            .as_ref()
            .is_some_and(|table| table.read().contains(field))
    }

    /// Accessor table of a synthesized nested type
    pub fn accessors(&self) -> Option<Vec<String>> {
        self.accessors
            .as_ref()
            .map(|table| table.read().iter().cloned().collect())
    }

    /// Check whether this type is `other` or one of its descendants
    pub fn is_a(&self, other: &ModelType) -> bool {
        std::ptr::eq(self, other) || self.parent().is_some_and(|parent| parent.is_a(other))
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("parent", &self.parent().map(|p| p.name().to_string()))
            .field("own_exclusions", &self.own_exclusions)
            .field("lenient", &self.lenient)
            .field("shape_policy", &self.shape_policy)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declares a [`ModelType`]
#[derive(Debug)]
pub struct ModelTypeBuilder {
    name: String,
    parent: Option<Arc<ModelType>>,
    exclusions: BTreeSet<String>,
    derived: Vec<DerivedAttr>,
    hash_paths: Vec<HashPath>,
    lenient: Option<bool>,
    shape_policy: Option<ShapePolicy>,
    accessors: Option<BTreeSet<String>>,
    nested: bool,
}

impl ModelTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            exclusions: BTreeSet::new(),
            derived: Vec::new(),
            hash_paths: Vec::new(),
            lenient: None,
            shape_policy: None,
            accessors: None,
            nested: false,
        }
    }

    pub fn extends(mut self, parent: &Arc<ModelType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare excluded field names; repeated calls merge
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare a derived attribute; replaces an inherited one of the same name
    pub fn derive(mut self, attr: DerivedAttr) -> Self {
        self.derived.push(attr);
        self
    }

    /// Declare a hash-path accessor; replaces an inherited one of the same name
    pub fn hash_path(mut self, path: HashPath) -> Self {
        self.hash_paths.push(path);
        self
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = Some(lenient);
        self
    }

    pub fn shape_policy(mut self, policy: ShapePolicy) -> Self {
        self.shape_policy = Some(policy);
        self
    }

    /// Extend `owner` as one of its synthesized nested types
    pub(super) fn nested_in(mut self, owner: &Arc<ModelType>) -> Self {
        self.parent = Some(Arc::clone(owner));
        self.nested = true;
        self
    }

    pub(super) fn accessors<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.accessors = Some(fields.into_iter().collect());
        self
    }

    pub fn build(self) -> Arc<ModelType> {
        let parent = self.parent.as_deref();

        let mut derived: Vec<DerivedAttr> = parent
            .map(|p| p.derived.clone())
            .unwrap_or_default();
        for attr in self.derived {
            derived.retain(|existing| existing.name() != attr.name());
            derived.push(attr);
        }

        let mut hash_paths: Vec<HashPath> = parent
            .map(|p| p.hash_paths.clone())
            .unwrap_or_default();
        for path in self.hash_paths {
            hash_paths.retain(|existing| existing.name != path.name);
            hash_paths.push(path);
        }

        let lenient = self
            .lenient
            .or(parent.map(|p| p.lenient))
            .unwrap_or(false);
        let shape_policy = self
            .shape_policy
            .or(parent.map(|p| p.shape_policy))
            .unwrap_or_default();

        let own_exclusions = ExclusionSet::new(self.exclusions);
        // Nested types may outlive their owner, so they merge eagerly
        let (parent, exclusions) = match self.parent {
            Some(owner) if self.nested => (
                Some(ParentLink::Owner(Arc::downgrade(&owner))),
                OnceLock::from(own_exclusions.merged_with(owner.exclusion_set())),
            ),
            Some(parent) => (Some(ParentLink::Declared(parent)), OnceLock::new()),
            None => (None, OnceLock::new()),
        };

        Arc::new(ModelType {
            name: self.name,
            parent,
            own_exclusions,
            exclusions,
            derived,
            hash_paths,
            lenient,
            shape_policy,
            accessors: self.accessors.map(RwLock::new),
            nested: Mutex::new(HashMap::new()),
        })
    }
}
