//! Model Instances
//!
//! A [`Model`] wraps one JSON object. Keys are normalized on the way in,
//! nested objects are promoted into child models unless their field is
//! excluded, and every stored field becomes readable through [`Model::read`].

use super::derived::{CacheCell, RESOURCE_GROUP, SUBSCRIPTION_ID};
use super::error::{json_kind, ModelError};
use super::key::{logical_name, normalize_key};
use super::types::ModelType;
use crate::response::ResponseMeta;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static NULL_FIELD: Field = Field::Value(Value::Null);

/// A stored field value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Field {
    /// Leaf value, or a raw object/array that was not promoted
    Value(Value),
    /// Promoted nested object
    Model(Model),
    /// Array holding at least one promoted object
    List(Vec<Field>),
}

impl Field {
    /// Shared null field returned for known-but-absent reads
    pub fn null() -> &'static Field {
        &NULL_FIELD
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Field::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Value(Value::Null))
    }

    /// Render back to plain JSON
    pub fn to_value(&self) -> Value {
        match self {
            Field::Value(value) => value.clone(),
            Field::Model(model) => model.to_value(),
            Field::List(items) => Value::Array(items.iter().map(Field::to_value).collect()),
        }
    }
}

/// Construction options
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructOptions {
    /// Store the data without exposing per-field accessors
    pub skip_accessors: bool,
}

/// One mapped JSON object
#[derive(Debug, Clone)]
pub struct Model {
    ty: Arc<ModelType>,
    store: IndexMap<String, Field>,
    /// Original key -> normalized key
    raw_keys: HashMap<String, String>,
    accessors: bool,
    response: Option<ResponseMeta>,
    derived: HashMap<String, CacheCell<String>>,
    hash_attrs: HashMap<String, CacheCell<Value>>,
}

impl Model {
    /// Map a JSON object with the given type
    pub fn new(ty: &Arc<ModelType>, data: Value) -> Result<Self, ModelError> {
        Self::with_options(ty, data, ConstructOptions::default())
    }

    pub fn with_options(
        ty: &Arc<ModelType>,
        data: Value,
        options: ConstructOptions,
    ) -> Result<Self, ModelError> {
        match data {
            Value::Object(map) => Self::from_map(ty, map, options),
            other => Err(ModelError::NotAnObject {
                type_name: ty.name().to_string(),
                found: json_kind(&other),
            }),
        }
    }

    /// Parse JSON text and map it
    pub fn from_json_str(ty: &Arc<ModelType>, json: &str) -> Result<Self, ModelError> {
        Self::new(ty, serde_json::from_str(json)?)
    }

    /// Map a response body and attach its transport metadata
    pub fn from_response(
        ty: &Arc<ModelType>,
        data: Value,
        meta: ResponseMeta,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(ty, data)?.with_response(meta))
    }

    pub(crate) fn with_response(mut self, meta: ResponseMeta) -> Self {
        self.response = Some(meta);
        self
    }

    /// Map every object of a list response
    ///
    /// Accepts a bare array or an object carrying the items under `value`.
    pub fn collection(ty: &Arc<ModelType>, data: Value) -> Result<Vec<Self>, ModelError> {
        let items = match data {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("value") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ModelError::NotACollection {
                        type_name: ty.name().to_string(),
                        found: "object",
                    })
                }
            },
            other => {
                return Err(ModelError::NotACollection {
                    type_name: ty.name().to_string(),
                    found: json_kind(&other),
                })
            }
        };

        items.into_iter().map(|item| Self::new(ty, item)).collect()
    }

    pub(crate) fn from_map(
        ty: &Arc<ModelType>,
        data: Map<String, Value>,
        options: ConstructOptions,
    ) -> Result<Self, ModelError> {
        let mut raw_keys = HashMap::with_capacity(data.len());
        let mut entries: IndexMap<String, Value> = IndexMap::with_capacity(data.len());

        // Collisions resolve before promotion so only the surviving value
        // shapes nested types
        for (raw_key, value) in data {
            let key = normalize_key(&raw_key);
            if entries.insert(key.clone(), value).is_some() {
                tracing::warn!(
                    "{}: key '{}' collides on '{}', keeping the later value",
                    ty.name(),
                    raw_key,
                    key
                );
            }
            raw_keys.insert(raw_key, key);
        }

        let mut store = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let field = convert(ty, &key, value)?;
            store.insert(key, field);
        }

        let derived = ty
            .derived_attrs()
            .iter()
            .map(|attr| (attr.name().to_string(), CacheCell::new()))
            .collect();
        let hash_attrs = ty
            .hash_paths()
            .iter()
            .map(|path| (path.name.clone(), CacheCell::new()))
            .collect();

        Ok(Self {
            ty: Arc::clone(ty),
            store,
            raw_keys,
            accessors: !options.skip_accessors,
            response: None,
            derived,
            hash_attrs,
        })
    }

    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Transport metadata attached at construction
    pub fn response(&self) -> Option<&ResponseMeta> {
        self.response.as_ref()
    }

    /// Read a field through the accessor table
    ///
    /// The key is normalized first, so `"ipAddress"` and `"ip_address"` read
    /// the same field. Known fields missing from this payload read as null.
    pub fn read(&self, key: &str) -> Result<&Field, ModelError> {
        let key = normalize_key(key);

        if self.accessors {
            if let Some(field) = self.store.get(&key) {
                return Ok(field);
            }
            if self.ty.has_accessor(&key) {
                return Ok(Field::null());
            }
        }

        if self.ty.is_lenient() {
            return Ok(self.store.get(&key).unwrap_or(Field::null()));
        }

        Err(ModelError::unknown_field(self.ty.name(), key))
    }

    /// Raw lookup that bypasses the accessor table
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.store.get(&normalize_key(key))
    }

    /// Store a value, applying the same promotion rules as construction
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        let normalized = normalize_key(key);
        let field = convert(&self.ty, &normalized, value)?;
        self.store.insert(normalized.clone(), field);
        self.raw_keys.insert(key.to_string(), normalized);
        Ok(())
    }

    /// Names of the fields this instance exposes
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.store
            .keys()
            .filter(|_| self.accessors)
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.store.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Render back to plain JSON with normalized keys
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.store
                .iter()
                .map(|(key, field)| (key.clone(), field.to_value()))
                .collect(),
        )
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Derived attribute by name, extracted once and cached
    ///
    /// Returns `None` when the source field is missing, not a string, or
    /// does not match; that outcome is cached too.
    pub fn derived(&self, name: &str) -> Option<&str> {
        let cell = self.derived.get(name)?;
        cell.get_or_compute(|| {
            let attr = self.ty.derived_attr(name)?;
            let source = self.raw_field(attr.source())?.as_str()?;
            attr.extract(source)
        })
        .map(String::as_str)
    }

    /// Cache cell of a derived attribute
    pub fn derived_cell(&self, name: &str) -> Option<&CacheCell<String>> {
        self.derived.get(name)
    }

    /// Resource group segment of the `id` field
    pub fn resource_group(&self) -> Option<&str> {
        self.derived(RESOURCE_GROUP)
    }

    /// Subscription segment of the `id` field
    pub fn subscription_id(&self) -> Option<&str> {
        self.derived(SUBSCRIPTION_ID)
    }

    pub fn set_resource_group(&mut self, value: Option<String>) {
        self.derived
            .insert(RESOURCE_GROUP.to_string(), CacheCell::computed(value));
    }

    pub fn set_subscription_id(&mut self, value: Option<String>) {
        self.derived
            .insert(SUBSCRIPTION_ID.to_string(), CacheCell::computed(value));
    }

    /// Value at a declared hash path, looked up once and cached
    pub fn hash_attr(&self, name: &str) -> Option<&Value> {
        let cell = self.hash_attrs.get(name)?;
        cell.get_or_compute(|| {
            let path = self.ty.hash_path(name)?;
            let (first, rest) = path.keys.split_first()?;
            let mut current = self.raw_field(first)?.to_value();
            for key in rest {
                current = lookup(&current, key)?.clone();
            }
            (!current.is_null()).then_some(current)
        })
    }

    /// Field under its original key, falling back to the normalized one
    fn raw_field(&self, raw_key: &str) -> Option<&Field> {
        match self.raw_keys.get(raw_key) {
            Some(key) => self.store.get(key),
            None => self.store.get(&normalize_key(raw_key)),
        }
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.store == other.store
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.store.len()))?;
        for (key, field) in &self.store {
            map.serialize_entry(key, field)?;
        }
        map.end()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}", self.to_value())
        } else {
            write!(f, "{}", self.to_value())
        }
    }
}

/// Apply the promotion rule to one field value
fn convert(ty: &Arc<ModelType>, key: &str, value: Value) -> Result<Field, ModelError> {
    if ty.is_excluded(key) {
        return Ok(Field::Value(value));
    }

    match value {
        Value::Object(map) => ty.promote(&logical_name(key), map).map(Field::Model),
        Value::Array(items) if items.iter().any(holds_object) => items
            .into_iter()
            .map(|item| convert(ty, key, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Field::List),
        other => Ok(Field::Value(other)),
    }
}

fn holds_object(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(holds_object),
        _ => false,
    }
}

fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    map.get(key).or_else(|| map.get(&normalize_key(key)))
}
