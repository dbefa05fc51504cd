//! Process-local store for development and tests

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::{CompositeKey, KeyValueStore, Record, StoreError};

type Partition = Vec<(String, Map<String, Value>)>;

/// In-memory table. Records within a partition keep insertion order; an
/// upsert replaces the record in place.
#[derive(Clone, Default)]
pub struct MemoryStore {
    partitions: Arc<RwLock<HashMap<String, Partition>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all partitions
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.partitions.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &CompositeKey) -> Result<Option<Record>, StoreError> {
        let partitions = self.partitions.read();
        let found = partitions
            .get(&key.pk)
            .and_then(|rows| rows.iter().find(|(sk, _)| *sk == key.sk))
            .map(|(_, attributes)| Record::new(key.clone(), attributes.clone()));
        Ok(found)
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let Record { key, attributes } = record;
        let mut partitions = self.partitions.write();
        let rows = partitions.entry(key.pk).or_default();

        match rows.iter_mut().find(|(sk, _)| *sk == key.sk) {
            Some(existing) => existing.1 = attributes,
            None => rows.push((key.sk, attributes)),
        }
        Ok(())
    }

    async fn query(&self, pk: &str, sk_prefix: Option<&str>) -> Result<Vec<Record>, StoreError> {
        let prefix = sk_prefix.unwrap_or("");
        let partitions = self.partitions.read();
        let records = partitions
            .get(pk)
            .map(|rows| {
                rows.iter()
                    .filter(|(sk, _)| sk.starts_with(prefix))
                    .map(|(sk, attributes)| {
                        Record::new(CompositeKey::new(pk, sk.clone()), attributes.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pk: &str, sk: &str, value: Value) -> Record {
        Record::from_item(CompositeKey::new(pk, sk), &value).unwrap()
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_key() {
        let store = MemoryStore::new();
        let found = store.get(&CompositeKey::new("USER#x", "PROFILE")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_same_key() {
        let store = MemoryStore::new();
        store.put(record("USER#1", "PROFILE", json!({"n": 1}))).await.unwrap();
        store.put(record("USER#1", "PROFILE", json!({"n": 2}))).await.unwrap();

        let found = store
            .get(&CompositeKey::new("USER#1", "PROFILE"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.attributes["n"], json!(2));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn query_filters_by_partition_and_prefix_in_insertion_order() {
        let store = MemoryStore::new();
        store.put(record("CLUTCH#1", "EGG#b", json!({"i": 0}))).await.unwrap();
        store.put(record("CLUTCH#1", "META", json!({"i": 1}))).await.unwrap();
        store.put(record("CLUTCH#1", "EGG#a", json!({"i": 2}))).await.unwrap();
        store.put(record("CLUTCH#2", "EGG#c", json!({"i": 3}))).await.unwrap();

        let eggs = store.query("CLUTCH#1", Some("EGG#")).await.unwrap();
        let sks: Vec<_> = eggs.iter().map(|r| r.key.sk.as_str()).collect();
        assert_eq!(sks, vec!["EGG#b", "EGG#a"]);

        let all = store.query("CLUTCH#1", None).await.unwrap();
        assert_eq!(all.len(), 3);

        assert!(store.query("CLUTCH#9", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overwrite_keeps_original_position() {
        let store = MemoryStore::new();
        store.put(record("items", "a", json!({"v": 1}))).await.unwrap();
        store.put(record("items", "b", json!({"v": 1}))).await.unwrap();
        store.put(record("items", "a", json!({"v": 2}))).await.unwrap();

        let all = store.query("items", None).await.unwrap();
        assert_eq!(all[0].key.sk, "a");
        assert_eq!(all[0].attributes["v"], json!(2));
        assert_eq!(all[1].key.sk, "b");
    }
}
