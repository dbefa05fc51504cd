//! PostgreSQL-backed store
//!
//! One table holds every resource family. Attributes live in a JSONB column
//! so each family keeps its own shape without schema changes.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};

use super::{CompositeKey, KeyValueStore, Record, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    pk: String,
    sk: String,
    data: Json<Value>,
}

impl TryFrom<RecordRow> for Record {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        match row.data.0 {
            Value::Object(attributes) => Ok(Record::new(CompositeKey::new(row.pk, row.sk), attributes)),
            _ => Err(StoreError::NotAnObject),
        }
    }
}

impl PgStore {
    /// `table` must already be a validated identifier (see `config`).
    pub fn new(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
        }
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                pk   TEXT  NOT NULL,
                sk   TEXT  NOT NULL,
                data JSONB NOT NULL,
                PRIMARY KEY (pk, sk)
            )
            "#,
            table = self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        tracing::info!(table = %self.table, "Record table ready");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn get(&self, key: &CompositeKey) -> Result<Option<Record>, StoreError> {
        let sql = format!("SELECT pk, sk, data FROM {} WHERE pk = $1 AND sk = $2", self.table);

        sqlx::query_as::<_, RecordRow>(&sql)
            .bind(&key.pk)
            .bind(&key.sk)
            .fetch_optional(&self.pool)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {} (pk, sk, data) VALUES ($1, $2, $3)
            ON CONFLICT (pk, sk) DO UPDATE SET data = EXCLUDED.data
            "#,
            self.table
        );

        sqlx::query(&sql)
            .bind(&record.key.pk)
            .bind(&record.key.sk)
            .bind(Json(Value::Object(record.attributes)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query(&self, pk: &str, sk_prefix: Option<&str>) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            r#"
            SELECT pk, sk, data FROM {}
            WHERE pk = $1 AND starts_with(sk, $2)
            ORDER BY sk
            "#,
            self.table
        );

        sqlx::query_as::<_, RecordRow>(&sql)
            .bind(pk)
            .bind(sk_prefix.unwrap_or(""))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Record::try_from)
            .collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if crate::db::health_check(&self.pool).await {
            Ok(())
        } else {
            Err(StoreError::Unavailable("database did not answer".to_string()))
        }
    }
}
