use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::store::{Collection, DocumentStore};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    id: String,
    created_at: DateTime<Utc>,
    body: Value,
}

#[derive(Debug, Default)]
struct Collections {
    next_seq: u64,
    entries: BTreeMap<Collection, Vec<Entry>>,
}

/// In-process document store. Each instance is independent.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl DocumentStore for MemoryStore {
    fn insert(
        &self,
        collection: Collection,
        id: &str,
        created_at: DateTime<Utc>,
        body: &Value,
    ) -> Result<()> {
        let mut guard = self.write()?;
        let seq = guard.next_seq;
        guard.next_seq += 1;
        let entries = guard.entries.entry(collection).or_default();
        if entries.iter().any(|entry| entry.id == id) {
            bail!("duplicate id {id} in {collection}");
        }
        entries.push(Entry {
            seq,
            id: id.to_string(),
            created_at,
            body: body.clone(),
        });
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let guard = self.read()?;
        Ok(guard
            .entries
            .get(&collection)
            .and_then(|entries| entries.iter().find(|entry| entry.id == id))
            .map(|entry| entry.body.clone()))
    }

    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let guard = self.read()?;
        let mut entries = guard
            .entries
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|entry| entry.body).collect())
    }

    fn replace(&self, collection: Collection, id: &str, body: &Value) -> Result<bool> {
        let mut guard = self.write()?;
        let Some(entry) = guard
            .entries
            .get_mut(&collection)
            .and_then(|entries| entries.iter_mut().find(|entry| entry.id == id))
        else {
            return Ok(false);
        };
        entry.body = body.clone();
        Ok(true)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut guard = self.write()?;
        let Some(entries) = guard.entries.get_mut(&collection) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        Ok(entries.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use crate::store::{Collection, DocumentStore, MemoryStore};

    #[test]
    fn same_timestamp_lists_latest_insert_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .insert(Collection::BehaviorRecords, "a", now, &json!({"id": "a"}))
            .expect("insert failed");
        store
            .insert(Collection::BehaviorRecords, "b", now, &json!({"id": "b"}))
            .expect("insert failed");
        let docs = store.list(Collection::BehaviorRecords).expect("list failed");
        assert_eq!(docs, vec![json!({"id": "b"}), json!({"id": "a"})]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .insert(Collection::Curriculum, "x", now, &json!({}))
            .expect("insert failed");
        assert!(store
            .insert(Collection::Curriculum, "x", now, &json!({}))
            .is_err());
    }
}
