//! Model Catalog
//!
//! The named model types of the Resource Manager API. Type definitions live
//! in JSON files embedded at compile time, so endpoint types can be added
//! without code changes; additional files can be loaded at runtime.
//!
//! Every catalog type descends from `BaseModel`, which excludes `tags` from
//! promotion and derives `resource_group` and `subscription_id` from `id`.
//!
//! # Definition format
//!
//! ```json
//! {
//!   "types": {
//!     "Network::Subnet": {
//!       "parent": "Network::VirtualNetwork",
//!       "exclude": ["properties#routeTable"],
//!       "derived": { "virtual_network": { "source": "id", "pattern": "(?i)virtualnetworks/([^/]+)" } },
//!       "hash_attrs": { "address_prefix": ["properties", "addressPrefix"] }
//!     }
//!   }
//! }
//! ```
//!
//! Parents must be defined before their children.

mod storage;

pub use storage::StorageAccountKey;

use crate::model::{DerivedAttr, HashPath, ModelError, ModelType, ShapePolicy};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

/// Root of every catalog hierarchy
pub const BASE_MODEL: &str = "BaseModel";

/// Embedded catalog files (compiled into the binary)
const CATALOG_FILES: &[&str] = &[
    include_str!("common.json"),
    include_str!("compute.json"),
    include_str!("network.json"),
    include_str!("storage.json"),
    include_str!("insights.json"),
];

/// Raw key path of a hash attribute: a single key or a list of keys
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyPath {
    One(String),
    Many(Vec<String>),
}

impl KeyPath {
    fn into_keys(self) -> Vec<String> {
        match self {
            KeyPath::One(key) => vec![key],
            KeyPath::Many(keys) => keys,
        }
    }
}

/// Derived attribute definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct DerivedDef {
    /// Raw key of the source field
    pub source: String,
    /// Regex whose first capture group is the value
    pub pattern: String,
}

/// Type definition from JSON
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeDef {
    /// Defaults to `BaseModel`
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub lenient: Option<bool>,
    #[serde(default)]
    pub shape_policy: Option<ShapePolicy>,
    #[serde(default)]
    pub derived: IndexMap<String, DerivedDef>,
    #[serde(default)]
    pub hash_attrs: IndexMap<String, KeyPath>,
}

/// Root structure of catalog/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub types: IndexMap<String, TypeDef>,
}

/// A set of named model types
#[derive(Debug)]
pub struct Catalog {
    types: IndexMap<String, Arc<ModelType>>,
}

/// Global catalog loaded from the embedded definitions
static CATALOG: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// A catalog holding only `BaseModel`
    pub fn new() -> Self {
        let base = ModelType::builder(BASE_MODEL)
            .exclude(["tags"])
            .derive(DerivedAttr::resource_group())
            .derive(DerivedAttr::subscription_id())
            .build();

        let mut types = IndexMap::new();
        types.insert(BASE_MODEL.to_string(), base);
        Self { types }
    }

    /// A fresh catalog with every embedded definition loaded
    pub fn embedded() -> Result<Self, ModelError> {
        let mut catalog = Self::new();
        for content in CATALOG_FILES {
            catalog.load_str(content)?;
        }
        Ok(catalog)
    }

    /// The process-wide catalog (loads the embedded definitions on first access)
    pub fn global() -> &'static Catalog {
        CATALOG.get_or_init(|| {
            Self::embedded()
                .unwrap_or_else(|e| panic!("Failed to load embedded model catalog: {}", e))
        })
    }

    /// Load definitions from JSON text, returning how many types were added
    ///
    /// The file is applied as a whole: if any definition fails, none of its
    /// types are added.
    pub fn load_str(&mut self, content: &str) -> Result<usize, ModelError> {
        let file: CatalogFile = serde_json::from_str(content)?;

        let mut staged = IndexMap::with_capacity(file.types.len());
        for (name, def) in file.types {
            let ty = self.build_type(&staged, &name, def)?;
            staged.insert(name, ty);
        }

        let count = staged.len();
        self.types.extend(staged);
        Ok(count)
    }

    /// Define one type
    pub fn define(&mut self, name: &str, def: TypeDef) -> Result<Arc<ModelType>, ModelError> {
        let ty = self.build_type(&IndexMap::new(), name, def)?;
        self.types.insert(name.to_string(), Arc::clone(&ty));
        Ok(ty)
    }

    /// Build a type against this catalog plus `staged` definitions not yet
    /// committed
    fn build_type(
        &self,
        staged: &IndexMap<String, Arc<ModelType>>,
        name: &str,
        def: TypeDef,
    ) -> Result<Arc<ModelType>, ModelError> {
        if self.types.contains_key(name) || staged.contains_key(name) {
            return Err(ModelError::catalog(format!("duplicate model type {}", name)));
        }

        let parent_name = def.parent.as_deref().unwrap_or(BASE_MODEL);
        let Some(parent) = staged
            .get(parent_name)
            .or_else(|| self.types.get(parent_name))
        else {
            return Err(ModelError::catalog(format!(
                "{} extends unknown type {}",
                name, parent_name
            )));
        };

        let mut builder = ModelType::builder(name).extends(parent).exclude(def.exclude);
        if let Some(lenient) = def.lenient {
            builder = builder.lenient(lenient);
        }
        if let Some(policy) = def.shape_policy {
            builder = builder.shape_policy(policy);
        }
        for (attr, derived) in def.derived {
            let pattern = Regex::new(&derived.pattern).map_err(|e| {
                ModelError::catalog(format!("{}.{}: invalid pattern: {}", name, attr, e))
            })?;
            builder = builder.derive(DerivedAttr::pattern(attr, derived.source, pattern));
        }
        for (attr, path) in def.hash_attrs {
            builder = builder.hash_path(HashPath::new(attr, path.into_keys()));
        }

        tracing::debug!("Defined model type {} extends {}", name, parent_name);
        Ok(builder.build())
    }

    /// Get a type by name
    pub fn get(&self, name: &str) -> Option<&Arc<ModelType>> {
        self.types.get(name)
    }

    /// Get a type by name, failing for unknown names
    pub fn require(&self, name: &str) -> Result<&Arc<ModelType>, ModelError> {
        self.get(name)
            .ok_or_else(|| ModelError::catalog(format!("unknown model type {}", name)))
    }

    pub fn base(&self) -> &Arc<ModelType> {
        &self.types[BASE_MODEL]
    }

    /// All type names, in definition order
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
