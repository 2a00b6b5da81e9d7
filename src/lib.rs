//! Schema-less models for Azure Resource Manager payloads
//!
//! Resource Manager endpoints return deeply nested JSON whose shape varies by
//! resource type. This crate maps such payloads onto attribute-accessible
//! [`Model`]s without a schema per endpoint: keys are normalized to snake
//! case, nested objects are promoted into child models (unless the field is
//! excluded, like `tags`), and identifiers such as the resource group are
//! extracted from the resource id on demand.
//!
//! # Architecture
//!
//! - [`model`] - The mapping engine: key normalization, exclusions, type
//!   hierarchy, nested promotion, derived attributes
//! - [`catalog`] - Named model types loaded from embedded JSON definitions
//! - [`response`] - Attaching HTTP response metadata to mapped models
//!
//! # Example
//!
//! ```
//! use armrest_model::{Catalog, Model};
//! use serde_json::json;
//!
//! let catalog = Catalog::embedded().unwrap();
//! let vm_type = catalog.require("VirtualMachine").unwrap();
//!
//! let vm = Model::new(vm_type, json!({
//!     "id": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
//!     "name": "vm1",
//!     "properties": {"hardwareProfile": {"vmSize": "Standard_D2s_v3"}}
//! })).unwrap();
//!
//! assert_eq!(vm.subscription_id(), Some("sub1"));
//! let size = vm.read("properties").unwrap().as_model().unwrap()
//!     .read("hardware_profile").unwrap().as_model().unwrap()
//!     .read("vm_size").unwrap();
//! assert_eq!(size.as_str(), Some("Standard_D2s_v3"));
//! ```

pub mod catalog;
pub mod model;
pub mod response;

pub use catalog::{Catalog, StorageAccountKey};
pub use model::{
    logical_name, normalize_key, CacheCell, CacheState, ConstructOptions, DerivedAttr,
    ExclusionSet, Field, HashPath, Model, ModelError, ModelType, ModelTypeBuilder, ShapePolicy,
};
pub use response::{model_from_response, models_from_response, ResponseMeta};
