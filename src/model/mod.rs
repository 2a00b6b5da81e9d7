//! Mapping engine
//!
//! Turns nested JSON objects into attribute-accessible models without a
//! hand-written schema per endpoint.
//!
//! # Module Structure
//!
//! - [`key`] - Field-name normalization
//! - [`exclusion`] - Fields exempt from promotion, with `scope#field` qualifiers
//! - [`types`] - Model types and their builder
//! - [`registry`] - Nested type synthesis and reuse during promotion
//! - [`instance`] - The [`Model`] itself: construction, reads, writes, serialization
//! - [`derived`] - Cached attributes extracted from other fields
//!
//! # Example
//!
//! ```
//! use armrest_model::{DerivedAttr, Model, ModelType};
//! use serde_json::json;
//!
//! let base = ModelType::builder("BaseModel")
//!     .exclude(["tags"])
//!     .derive(DerivedAttr::resource_group())
//!     .build();
//! let vm_type = ModelType::builder("VirtualMachine").extends(&base).build();
//!
//! let vm = Model::new(&vm_type, json!({
//!     "id": "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
//!     "properties": {"vmId": "1234"},
//!     "tags": {"env": "prod"}
//! })).unwrap();
//!
//! assert_eq!(vm.resource_group(), Some("rg1"));
//! let properties = vm.read("properties").unwrap().as_model().unwrap();
//! assert_eq!(properties.read("vmId").unwrap().as_str(), Some("1234"));
//! ```

pub mod derived;
pub mod error;
pub mod exclusion;
pub mod instance;
pub mod key;
pub mod registry;
pub mod types;

pub use derived::{CacheCell, CacheState, DerivedAttr, HashPath};
pub use error::ModelError;
pub use exclusion::ExclusionSet;
pub use instance::{ConstructOptions, Field, Model};
pub use key::{logical_name, normalize_key};
pub use types::{ModelType, ModelTypeBuilder, ShapePolicy};
