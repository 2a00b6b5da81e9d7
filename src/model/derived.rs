//! Derived Attributes
//!
//! Values extracted from another stored field on first access and cached per
//! model instance, including the "nothing found" outcome.

use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

#[allow(clippy::expect_used)] // static regex, it doesn't panic
static RESOURCE_GROUP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)resourcegroups/([^/]+)").expect("static regex should not panic")
});
#[allow(clippy::expect_used)] // static regex, it doesn't panic
static SUBSCRIPTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)subscriptions/([^/]+)").expect("static regex should not panic")
});

/// Raw field holding the ARM resource identifier
pub const RESOURCE_ID_FIELD: &str = "id";
pub const RESOURCE_GROUP: &str = "resource_group";
pub const SUBSCRIPTION_ID: &str = "subscription_id";

/// Observable state of a [`CacheCell`]
#[derive(Debug, PartialEq, Eq)]
pub enum CacheState<'a, T> {
    Uncomputed,
    Value(&'a T),
    NoValue,
}

/// Write-once cache cell that remembers absence as well as values
#[derive(Debug, Clone)]
pub struct CacheCell<T> {
    cell: OnceLock<Option<T>>,
}

impl<T> Default for CacheCell<T> {
    fn default() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }
}

impl<T> CacheCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cell that is already computed
    pub fn computed(value: Option<T>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Self { cell }
    }

    pub fn state(&self) -> CacheState<'_, T> {
        match self.cell.get() {
            None => CacheState::Uncomputed,
            Some(Some(value)) => CacheState::Value(value),
            Some(None) => CacheState::NoValue,
        }
    }

    /// Return the cached outcome, running `compute` only if the cell is empty
    pub fn get_or_compute(&self, compute: impl FnOnce() -> Option<T>) -> Option<&T> {
        self.cell.get_or_init(compute).as_ref()
    }
}

type Extractor = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A named attribute derived from one raw string field
#[derive(Clone)]
pub struct DerivedAttr {
    name: String,
    source: String,
    extract: Extractor,
}

impl DerivedAttr {
    /// Declare a derived attribute reading the raw field `source`
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        extract: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            extract: Arc::new(extract),
        }
    }

    /// Derived attribute taking the first capture group of `pattern`
    pub fn pattern(name: impl Into<String>, source: impl Into<String>, pattern: Regex) -> Self {
        Self::new(name, source, move |text| capture(&pattern, text))
    }

    /// Resource group segment of the resource id
    pub fn resource_group() -> Self {
        Self::new(RESOURCE_GROUP, RESOURCE_ID_FIELD, |id| {
            capture(&RESOURCE_GROUP_REGEX, id)
        })
    }

    /// Subscription segment of the resource id
    pub fn subscription_id() -> Self {
        Self::new(SUBSCRIPTION_ID, RESOURCE_ID_FIELD, |id| {
            capture(&SUBSCRIPTION_REGEX, id)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw (pre-normalization) key of the source field
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn extract(&self, text: &str) -> Option<String> {
        (self.extract)(text)
    }
}

impl fmt::Debug for DerivedAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedAttr")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// A named accessor reading a path of raw keys, e.g. `address -> Properties.ipAddress`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashPath {
    pub name: String,
    pub keys: Vec<String>,
}

impl HashPath {
    pub fn new<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
