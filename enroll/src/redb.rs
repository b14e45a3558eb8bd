//! [`EnrollmentStore`] backed by a single redb database file.

use std::path::Path;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use voxgate_voiceprint::Embedding;

use crate::codec;
use crate::error::StoreError;
use crate::store::{EnrollmentStore, check_user_id};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("enrollments");

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// A persistent enrollment store backed by redb.
///
/// Every `put` is its own committed write transaction.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a redb store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let db = Database::create(path).map_err(backend)?;

        let tx = db.begin_write().map_err(backend)?;
        {
            let _ = tx.open_table(TABLE).map_err(backend)?;
        }
        tx.commit().map_err(backend)?;

        tracing::debug!(path = %path.display(), "enroll: opened redb store");
        Ok(Self { db })
    }
}

impl EnrollmentStore for RedbStore {
    fn put(&self, user_id: &str, embedding: &Embedding) -> Result<(), StoreError> {
        check_user_id(user_id).map_err(|_| StoreError::InvalidKey(user_id.to_string()))?;
        let data = codec::encode(embedding);

        let tx = self.db.begin_write().map_err(backend)?;
        {
            let mut table = tx.open_table(TABLE).map_err(backend)?;
            table.insert(user_id, data.as_slice()).map_err(backend)?;
        }
        tx.commit().map_err(backend)?;
        Ok(())
    }

    fn get(&self, user_id: &str) -> Result<Option<Embedding>, StoreError> {
        let tx = self.db.begin_read().map_err(backend)?;
        let table = tx.open_table(TABLE).map_err(backend)?;

        match table.get(user_id).map_err(backend)? {
            Some(value) => codec::decode(value.value())
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: user_id.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn all(&self) -> Result<Vec<(String, Embedding)>, StoreError> {
        let tx = self.db.begin_read().map_err(backend)?;
        let table = tx.open_table(TABLE).map_err(backend)?;

        let mut results = Vec::new();
        for item in table.iter().map_err(backend)? {
            let (key, value) = item.map_err(backend)?;
            let user_id = key.value().to_string();
            let embedding = codec::decode(value.value()).map_err(|source| StoreError::Corrupt {
                key: user_id.clone(),
                source,
            })?;
            results.push((user_id, embedding));
        }

        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    fn len(&self) -> Result<usize, StoreError> {
        let tx = self.db.begin_read().map_err(backend)?;
        let table = tx.open_table(TABLE).map_err(backend)?;
        let n = table.len().map_err(backend)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn emb(v: &[f32]) -> Embedding {
        Embedding::new(v.to_vec())
    }

    #[test]
    fn basic_operations() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("enroll.redb")).unwrap();

        assert!(store.is_empty().unwrap());
        store.put("bob", &emb(&[1.0, 0.0])).unwrap();
        store.put("alice", &emb(&[0.0, 1.0])).unwrap();
        store.put("bob", &emb(&[0.6, 0.8])).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get("bob").unwrap(), Some(emb(&[0.6, 0.8])));
        assert_eq!(store.get("carol").unwrap(), None);

        let ids: Vec<String> = store.all().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(ids, vec!["alice", "bob"]);
    }

    #[test]
    fn persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("enroll.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.put("alice", &emb(&[0.25, -0.5])).unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("alice").unwrap(), Some(emb(&[0.25, -0.5])));
    }

    #[test]
    fn invalid_key() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("enroll.redb")).unwrap();
        assert!(matches!(
            store.put("", &emb(&[1.0])),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
