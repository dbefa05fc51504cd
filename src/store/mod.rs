//! Key-value record store
//!
//! Every resource lives in one logical table addressed by a composite
//! `(pk, sk)` key. A resource family picks its own partition prefix
//! (`USER#<id>`, `items`, ...) and sort-key scheme; all of them share the
//! get / put / query-by-prefix contract below.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Settings, StoreBackend};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record attributes must be a JSON object")]
    NotAnObject,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// `(partition, sort)` pair addressing exactly one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub pk: String,
    pub sk: String,
}

impl CompositeKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// A stored record: its key plus a flat attribute object.
///
/// Key fields are kept out of `attributes`, so decoding a record never
/// leaks `pk`/`sk` into a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: CompositeKey,
    pub attributes: Map<String, Value>,
}

impl Record {
    pub fn new(key: CompositeKey, attributes: Map<String, Value>) -> Self {
        Self { key, attributes }
    }

    /// Serialize `item` into the attribute object of a new record.
    pub fn from_item<T: Serialize>(key: CompositeKey, item: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(item)? {
            Value::Object(attributes) => Ok(Self { key, attributes }),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Deserialize the attribute object into a typed item.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.attributes.clone()))?)
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the record at `key`, if any.
    async fn get(&self, key: &CompositeKey) -> Result<Option<Record>, StoreError>;

    /// Upsert; an existing record with the same key is overwritten.
    async fn put(&self, record: Record) -> Result<(), StoreError>;

    /// All records in partition `pk` whose sort key starts with `sk_prefix`
    /// (every record in the partition when `None`), in storage order.
    async fn query(&self, pk: &str, sk_prefix: Option<&str>) -> Result<Vec<Record>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Build the configured backend. Called once at startup.
pub async fn connect(settings: &Settings) -> anyhow::Result<SharedStore> {
    match settings.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = crate::db::create_pool(settings).await?;
            let store = PgStore::new(pool, &settings.table_name);
            store.ensure_table().await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Widget {
        name: String,
        size: u32,
    }

    #[test]
    fn record_round_trips_a_struct_without_key_fields() {
        let key = CompositeKey::new("WIDGET#1", "META");
        let widget = Widget {
            name: "gear".into(),
            size: 3,
        };

        let record = Record::from_item(key.clone(), &widget).unwrap();
        assert_eq!(record.key, key);
        assert!(!record.attributes.contains_key("pk"));
        assert!(!record.attributes.contains_key("sk"));
        assert_eq!(record.decode::<Widget>().unwrap(), widget);
    }

    #[test]
    fn non_object_items_are_rejected() {
        let err = Record::from_item(CompositeKey::new("a", "b"), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject));
    }
}
