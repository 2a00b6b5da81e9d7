//! Storage account key view

use crate::model::Model;
use serde_json::Value;

/// Typed view over a `StorageAccountKey` model
///
/// The list-keys endpoint returns one entry per key, each carrying its
/// `keyName` (`key1` or `key2`) and `value`.
#[derive(Debug, Clone, Copy)]
pub struct StorageAccountKey<'a> {
    model: &'a Model,
}

impl<'a> StorageAccountKey<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    pub fn key_name(&self) -> Option<&'a str> {
        self.model.hash_attr("key_name").and_then(Value::as_str)
    }

    pub fn value(&self) -> Option<&'a str> {
        self.model.hash_attr("value").and_then(Value::as_str)
    }

    /// The key value if this entry is `key1`
    pub fn key1(&self) -> Option<&'a str> {
        self.value_if_named("key1")
    }

    /// The key value if this entry is `key2`
    pub fn key2(&self) -> Option<&'a str> {
        self.value_if_named("key2")
    }

    /// Whichever of `key1` / `key2` this entry holds
    pub fn key(&self) -> Option<&'a str> {
        self.key1().or_else(|| self.key2())
    }

    fn value_if_named(&self, name: &str) -> Option<&'a str> {
        if self.key_name()? == name {
            self.value()
        } else {
            None
        }
    }
}
