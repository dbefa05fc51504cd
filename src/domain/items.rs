//! Generic item records
//!
//! Schemaless resource kept in the shared `items` partition with the item id
//! as sort key.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::store::CompositeKey;

pub const ITEMS_PARTITION: &str = "items";

pub fn item_key(id: &str) -> CompositeKey {
    CompositeKey::new(ITEMS_PARTITION, id)
}

/// Attributes as stored: caller fields, then the generated `id` and
/// `createdAt` (which win over caller-supplied values of the same name).
pub fn stored_item(id: &str, body: &Map<String, Value>, now: DateTime<Utc>) -> Map<String, Value> {
    let mut item = body.clone();
    item.insert("id".to_string(), Value::String(id.to_string()));
    item.insert("createdAt".to_string(), Value::String(now.to_rfc3339()));
    item
}

/// Attributes returned from creation: caller fields plus `id`.
pub fn created_item(id: &str, body: &Map<String, Value>) -> Map<String, Value> {
    let mut item = body.clone();
    item.insert("id".to_string(), Value::String(id.to_string()));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_fields_override_body() {
        let body = json!({"id": "mine", "createdAt": "yesterday", "color": "red"});
        let body = body.as_object().unwrap();
        let now = Utc::now();

        let stored = stored_item("gen-1", body, now);
        assert_eq!(stored["id"], json!("gen-1"));
        assert_eq!(stored["createdAt"], json!(now.to_rfc3339()));
        assert_eq!(stored["color"], json!("red"));

        let created = created_item("gen-1", body);
        assert_eq!(created["id"], json!("gen-1"));
        assert_eq!(created["color"], json!("red"));
    }

    #[test]
    fn items_share_one_partition_keyed_by_id() {
        let key = item_key("gen-1");
        assert_eq!(key.pk, "items");
        assert_eq!(key.sk, "gen-1");
    }
}
