//! Nested Type Registry
//!
//! Promotes nested JSON objects into models. Each owner type keeps its own
//! registry of nested types keyed by logical name; the first promotion under
//! a name synthesizes `Owner::Name` extending the owner, later promotions
//! reuse it. The owner holds its nested types; they point back weakly, so
//! a type graph is freed once the owner and its models are dropped.
//!
//! Reuse is nominal. The accessor table of a synthesized type is the field
//! set of the payload that created it; what happens when a later payload
//! brings more fields depends on the type's [`ShapePolicy`].

use super::error::ModelError;
use super::instance::{ConstructOptions, Model};
use super::key::normalize_key;
use super::types::{ModelType, ModelTypeBuilder, ShapePolicy};
use serde_json::{Map, Value};
use std::sync::Arc;

impl ModelType {
    /// Promote a nested object stored under `logical_name` into a model
    pub fn promote(
        self: &Arc<Self>,
        logical_name: &str,
        nested: Map<String, Value>,
    ) -> Result<Model, ModelError> {
        let fields: Vec<String> = nested.keys().map(|key| normalize_key(key)).collect();
        let ty = self.resolve_nested(logical_name, &fields)?;
        Model::from_map(&ty, nested, ConstructOptions::default())
    }

    /// Nested type registered under `logical_name`, if any
    pub fn nested_type(&self, logical_name: &str) -> Option<Arc<ModelType>> {
        self.nested.lock().get(logical_name).cloned()
    }

    /// Logical names of all nested types registered under this type
    pub fn nested_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nested.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Find or create the nested type for a payload with the given fields
    ///
    /// Registration happens under the owner's lock, so concurrent callers
    /// promoting the same name all receive the one installed type.
    fn resolve_nested(
        self: &Arc<Self>,
        logical_name: &str,
        fields: &[String],
    ) -> Result<Arc<ModelType>, ModelError> {
        let existing = {
            let mut nested = self.nested.lock();
            match nested.get(logical_name) {
                Some(ty) => Arc::clone(ty),
                None => {
                    let ty = self.synthesize(logical_name, fields);
                    nested.insert(logical_name.to_string(), Arc::clone(&ty));
                    return Ok(ty);
                }
            }
        };

        existing.check_shape(fields)?;
        Ok(existing)
    }

    fn synthesize(self: &Arc<Self>, logical_name: &str, fields: &[String]) -> Arc<ModelType> {
        let scoped = self.exclusion_set().scoped_to(logical_name);
        let name = format!("{}::{}", self.name(), logical_name);

        tracing::debug!(
            "Synthesizing nested type {} ({} fields, scoped exclusions: {:?})",
            name,
            fields.len(),
            scoped
        );

        ModelTypeBuilder::new(name)
            .nested_in(self)
            .exclude(scoped)
            .accessors(fields.iter().cloned())
            .build()
    }

    fn check_shape(&self, fields: &[String]) -> Result<(), ModelError> {
        let Some(table) = &self.accessors else {
            return Ok(());
        };

        match self.shape_policy() {
            ShapePolicy::Strict => {
                let known = table.read();
                let mut missing: Vec<String> = fields
                    .iter()
                    .filter(|field| !known.contains(*field))
                    .cloned()
                    .collect();
                if missing.is_empty() {
                    return Ok(());
                }
                missing.sort();
                missing.dedup();
                tracing::warn!(
                    "Reused nested type {} has no accessors for {:?}",
                    self.name(),
                    missing
                );
                Err(ModelError::ShapeMismatch {
                    type_name: self.name().to_string(),
                    fields: missing,
                })
            }
            ShapePolicy::Extend => {
                let mut known = table.write();
                for field in fields {
                    if known.insert(field.clone()) {
                        tracing::debug!("Extended {} with accessor {}", self.name(), field);
                    }
                }
                Ok(())
            }
        }
    }
}
