use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{Course, Keyed, Professor, RequestRecord, Thesis};
use crate::repository::{Collection, PersistenceGateway};

/// Rows in storage order with an id index for direct lookup.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<T>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(row);
        }
        table
    }

    /// Appends a row, or replaces in place the row that already has its id.
    pub fn insert(&mut self, row: T) {
        match self.index.get(row.key()) {
            Some(&pos) => self.rows[pos] = row,
            None => {
                self.index.insert(row.key().to_string(), self.rows.len());
                self.rows.push(row);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.rows[pos])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).map(|&pos| &mut self.rows[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads one collection into a table. Records that do not fit `T` make the
/// whole collection count as corrupt, which loads as empty.
pub async fn load_table<T>(
    gateway: &dyn PersistenceGateway,
    collection: Collection,
) -> Result<Table<T>, AppError>
where
    T: DeserializeOwned + Keyed,
{
    let records = gateway.load_all(collection).await?;
    match serde_json::from_value::<Vec<T>>(Value::Array(records)) {
        Ok(rows) => Ok(Table::from_rows(rows)),
        Err(e) => {
            warn!(
                "collection '{}' has malformed records, treating as empty: {}",
                collection.name(),
                e
            );
            Ok(Table::new())
        }
    }
}

pub fn encode_table<T: Serialize>(table: &Table<T>) -> Result<Vec<Value>, AppError> {
    table
        .rows
        .iter()
        .map(|row| serde_json::to_value(row).map_err(AppError::from))
        .collect()
}

pub async fn save_table<T: Serialize>(
    gateway: &dyn PersistenceGateway,
    collection: Collection,
    table: &Table<T>,
) -> Result<(), AppError> {
    gateway.save_all(collection, encode_table(table)?).await
}

/// In-memory snapshot of every collection the workflow touches.
#[derive(Debug, Default)]
pub struct Registry {
    pub courses: Table<Course>,
    pub requests: Table<RequestRecord>,
    pub theses: Table<Thesis>,
    pub professors: Table<Professor>,
    dirty: BTreeSet<Collection>,
}

impl Registry {
    pub async fn load(gateway: &dyn PersistenceGateway) -> Result<Self, AppError> {
        Ok(Self {
            courses: load_table(gateway, Collection::Courses).await?,
            requests: load_table(gateway, Collection::Requests).await?,
            theses: load_table(gateway, Collection::Theses).await?,
            professors: load_table(gateway, Collection::Professors).await?,
            dirty: BTreeSet::new(),
        })
    }

    pub fn mark_dirty(&mut self, collection: Collection) {
        self.dirty.insert(collection);
    }

    pub fn is_dirty(&self, collection: Collection) -> bool {
        self.dirty.contains(&collection)
    }

    /// Writes back every modified collection in a fixed order. A failure
    /// part-way leaves the earlier saves in place.
    pub async fn commit(&mut self, gateway: &dyn PersistenceGateway) -> Result<(), AppError> {
        let dirty = std::mem::take(&mut self.dirty);
        for collection in dirty {
            match collection {
                Collection::Requests => save_table(gateway, collection, &self.requests).await?,
                Collection::Theses => save_table(gateway, collection, &self.theses).await?,
                Collection::Professors => save_table(gateway, collection, &self.professors).await?,
                Collection::Courses => save_table(gateway, collection, &self.courses).await?,
                Collection::Students => {}
            }
            debug!("committed collection '{}'", collection.name());
        }
        Ok(())
    }
}
