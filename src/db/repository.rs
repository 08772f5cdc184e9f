use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

use crate::error::AppError;
use crate::repository::{Collection, PersistenceGateway, parse_records};

/// Stores each collection as one JSON array in the `collections` table.
#[derive(Clone)]
pub struct SqliteGateway {
    db: SqlitePool,
}

impl SqliteGateway {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Opens the pool and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self::new(db))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

pub async fn find_collection(db: &SqlitePool, name: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT records FROM collections WHERE name = ?")
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn upsert_collection(db: &SqlitePool, name: &str, records: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO collections (name, records, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(name) DO UPDATE SET
            records = excluded.records,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(name)
    .bind(records)
    .bind(now)
    .execute(db)
    .await?;
    Ok(())
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        match find_collection(&self.db, collection.name()).await? {
            Some(raw) => Ok(parse_records(collection, &raw)),
            None => Ok(Vec::new()),
        }
    }

    async fn save_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), AppError> {
        let body = serde_json::to_string(&records)?;
        upsert_collection(&self.db, collection.name(), &body).await?;
        debug!("saved {} records to '{}'", records.len(), collection.name());
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}
