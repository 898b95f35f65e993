use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::store::migrations::BASE_MIGRATION;
use crate::store::{Collection, DocumentStore};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(BASE_MIGRATION)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }
}

impl DocumentStore for SqliteStore {
    fn insert(
        &self,
        collection: Collection,
        id: &str,
        created_at: DateTime<Utc>,
        body: &Value,
    ) -> Result<()> {
        self.conn()?.execute(
            r#"
INSERT INTO documents(collection, id, created_at, body_json)
VALUES (?1, ?2, ?3, ?4)
"#,
            params![
                collection.as_slug(),
                id,
                // fixed width so lexical order matches time order
                created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                serde_json::to_string(body)?
            ],
        )?;
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
SELECT body_json
FROM documents
WHERE collection = ?1 AND id = ?2
"#,
        )?;
        let json: Option<String> = stmt
            .query_row(params![collection.as_slug(), id], |row| row.get(0))
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
SELECT body_json
FROM documents
WHERE collection = ?1
ORDER BY created_at DESC, seq DESC
"#,
        )?;
        let rows = stmt
            .query_map(params![collection.as_slug()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut docs = Vec::with_capacity(rows.len());
        for json in rows {
            docs.push(serde_json::from_str(&json)?);
        }
        Ok(docs)
    }

    fn replace(&self, collection: Collection, id: &str, body: &Value) -> Result<bool> {
        let changed = self.conn()?.execute(
            r#"
UPDATE documents
SET body_json = ?3
WHERE collection = ?1 AND id = ?2
"#,
            params![collection.as_slug(), id, serde_json::to_string(body)?],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let changed = self.conn()?.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_slug(), id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::store::{Collection, DocumentStore, SqliteStore};

    #[test]
    fn lists_newest_first_within_collection() {
        let store = SqliteStore::open_in_memory().expect("failed opening store");
        let now = Utc::now();
        store
            .insert(Collection::Curriculum, "old", now - Duration::hours(1), &json!({"n": 1}))
            .expect("insert failed");
        store
            .insert(Collection::Curriculum, "new", now, &json!({"n": 2}))
            .expect("insert failed");
        store
            .insert(Collection::Assignments, "other", now, &json!({"n": 3}))
            .expect("insert failed");

        let docs = store.list(Collection::Curriculum).expect("list failed");
        assert_eq!(docs, vec![json!({"n": 2}), json!({"n": 1})]);
    }

    #[test]
    fn replace_and_delete_report_missing_ids() {
        let store = SqliteStore::open_in_memory().expect("failed opening store");
        assert!(!store
            .replace(Collection::Assignments, "nope", &json!({}))
            .expect("replace failed"));
        assert!(!store
            .delete(Collection::Assignments, "nope")
            .expect("delete failed"));

        store
            .insert(Collection::Assignments, "a1", Utc::now(), &json!({"v": 1}))
            .expect("insert failed");
        assert!(store
            .replace(Collection::Assignments, "a1", &json!({"v": 2}))
            .expect("replace failed"));
        assert_eq!(
            store.get(Collection::Assignments, "a1").expect("get failed"),
            Some(json!({"v": 2}))
        );
        assert!(store
            .delete(Collection::Assignments, "a1")
            .expect("delete failed"));
        assert_eq!(
            store.get(Collection::Assignments, "a1").expect("get failed"),
            None
        );
    }
}
