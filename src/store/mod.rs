pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{ToolError, ToolResult, Violations};
use crate::standards::StandardRef;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Curriculum,
    Assignments,
    StudyMaterials,
    RemediationPlans,
    BehaviorRecords,
}

impl Collection {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Curriculum => "curriculum",
            Self::Assignments => "assignments",
            Self::StudyMaterials => "study_materials",
            Self::RemediationPlans => "remediation_plans",
            Self::BehaviorRecords => "behavior_records",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

/// JSON document storage keyed by collection and id.
///
/// Implementations own their own concurrency control; callers never hold a
/// lock across calls.
pub trait DocumentStore: Send + Sync {
    fn insert(
        &self,
        collection: Collection,
        id: &str,
        created_at: DateTime<Utc>,
        body: &Value,
    ) -> Result<()>;
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;
    /// Newest first by creation time.
    fn list(&self, collection: Collection) -> Result<Vec<Value>>;
    /// Returns `false` when no document with `id` exists.
    fn replace(&self, collection: Collection, id: &str, body: &Value) -> Result<bool>;
    /// Returns `false` when no document with `id` exists.
    fn delete(&self, collection: Collection, id: &str) -> Result<bool>;
}

pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StorageBackend::Sqlite => {
            let path = config.resolved_db_path();
            let store = SqliteStore::open(&path)
                .with_context(|| format!("failed opening store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// A stored entity: server-assigned identity plus the submitted body.
///
/// Timestamps default to the epoch when absent so that inline references
/// echoed back by clients only need an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Human readable entity name used in error messages.
    const ENTITY: &'static str;

    fn validate(&self) -> Violations;

    /// Fills server-side defaults before validation.
    fn apply_defaults(&mut self, _now: DateTime<Utc>) {}

    fn standard_refs(&self) -> Vec<&StandardRef> {
        Vec::new()
    }

    fn standard_refs_mut(&mut self) -> Vec<&mut StandardRef> {
        Vec::new()
    }

    fn references_standard(&self, standard_record_id: &str) -> bool {
        self.standard_refs()
            .iter()
            .any(|reference| reference.id() == standard_record_id)
    }
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn list(&self) -> ToolResult<Vec<Record<T>>> {
        let docs = self.store.list(T::COLLECTION)?;
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            records.push(decode::<T>(doc)?);
        }
        Ok(records)
    }

    pub fn find(&self, id: &str) -> ToolResult<Option<Record<T>>> {
        match self.store.get(T::COLLECTION, id)? {
            Some(doc) => Ok(Some(decode::<T>(doc)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self, id: &str) -> ToolResult<Record<T>> {
        self.find(id)?
            .ok_or_else(|| ToolError::not_found(T::ENTITY, id))
    }

    pub fn create(&self, mut body: T) -> ToolResult<Record<T>> {
        let now = Utc::now();
        body.apply_defaults(now);
        body.validate().into_result()?;
        let record = Record {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            body,
        };
        let doc = encode(&record)?;
        self.store
            .insert(T::COLLECTION, &record.id, record.created_at, &doc)?;
        Ok(record)
    }

    /// Full-document replace; identity and creation time are kept.
    pub fn replace(&self, id: &str, mut body: T) -> ToolResult<Record<T>> {
        let existing = self.get(id)?;
        let now = Utc::now();
        body.apply_defaults(now);
        body.validate().into_result()?;
        let record = Record {
            id: existing.id,
            created_at: existing.created_at,
            updated_at: now,
            body,
        };
        self.write(&record)?;
        Ok(record)
    }

    /// Persists an already-validated record in place.
    pub fn write(&self, record: &Record<T>) -> ToolResult<()> {
        let doc = encode(record)?;
        if !self.store.replace(T::COLLECTION, &record.id, &doc)? {
            return Err(ToolError::not_found(T::ENTITY, record.id.clone()));
        }
        Ok(())
    }

    pub fn delete(&self, id: &str) -> ToolResult<String> {
        if self.store.delete(T::COLLECTION, id)? {
            Ok(id.to_string())
        } else {
            Err(ToolError::not_found(T::ENTITY, id))
        }
    }
}

fn encode<T: Document>(record: &Record<T>) -> ToolResult<Value> {
    let doc = serde_json::to_value(record)
        .with_context(|| format!("failed encoding {} {}", T::ENTITY, record.id))?;
    Ok(doc)
}

fn decode<T: Document>(doc: Value) -> ToolResult<Record<T>> {
    let record = serde_json::from_value(doc)
        .with_context(|| format!("stored {} document is unreadable", T::COLLECTION))?;
    Ok(record)
}
