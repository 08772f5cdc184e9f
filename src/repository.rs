use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AppError;

/// Named record collections. Variant order is the order dirty collections are saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Requests,
    Theses,
    Professors,
    Courses,
    Students,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Requests => "requests",
            Collection::Theses => "theses",
            Collection::Professors => "professors",
            Collection::Courses => "courses",
            Collection::Students => "students",
        }
    }
}

/// Whole-collection storage. Loading a missing or corrupt collection yields no records.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, AppError>;
    async fn save_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), AppError>;

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Parses a stored JSON array; anything else counts as corruption and loads as empty.
pub(crate) fn parse_records(collection: Collection, raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                "collection '{}' is corrupt, treating as empty: {}",
                collection.name(),
                e
            );
            Vec::new()
        }
    }
}

/// One pretty-printed JSON file per collection, `<dir>/<name>.json`.
pub struct JsonFileGateway {
    dir: PathBuf,
}

impl JsonFileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.name()))
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        let path = self.path_for(collection);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no file for collection '{}'", collection.name());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(parse_records(collection, &raw))
    }

    async fn save_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(self.path_for(collection), body).await?;
        debug!("saved {} records to '{}'", records.len(), collection.name());
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

/// Process-local storage, used by tests and for throwaway runs.
#[derive(Default)]
pub struct MemoryGateway {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load_all(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.lock().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn save_all(&self, collection: Collection, records: Vec<Value>) -> Result<(), AppError> {
        self.collections.lock().await.insert(collection, records);
        Ok(())
    }
}
