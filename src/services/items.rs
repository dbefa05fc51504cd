//! Generic item resource: create and list records in the `items` partition.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::domain::items::{created_item, item_key, stored_item, ITEMS_PARTITION};
use crate::error::{ApiError, ApiResult};
use crate::store::{Record, SharedStore};

#[derive(Clone)]
pub struct ItemService {
    store: SharedStore,
}

impl ItemService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, body: Value) -> ApiResult<Map<String, Value>> {
        let Value::Object(body) = body else {
            return Err(ApiError::validation("Request body must be a JSON object"));
        };

        let id = Uuid::new_v4().to_string();
        let record = Record::new(item_key(&id), stored_item(&id, &body, Utc::now()));
        self.store.put(record).await?;

        info!(item_id = %id, "Item created");
        Ok(created_item(&id, &body))
    }

    pub async fn list(&self) -> ApiResult<Vec<Map<String, Value>>> {
        let records = self.store.query(ITEMS_PARTITION, None).await?;
        Ok(records.into_iter().map(|r| r.attributes).collect())
    }
}
