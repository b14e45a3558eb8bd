use std::collections::BTreeMap;
use std::sync::RwLock;

use voxgate_voiceprint::Embedding;

use crate::error::StoreError;

/// Maximum user id length in bytes.
pub const MAX_USER_ID_LEN: usize = 128;

/// Persists one embedding per user id.
///
/// Writes overwrite (last write wins). [`EnrollmentStore::all`] returns
/// records sorted by user id, which makes the identification scan order
/// deterministic across backends.
///
/// Implementations must be safe for concurrent use and must never expose
/// a partially written record.
pub trait EnrollmentStore: Send + Sync {
    /// Stores or replaces the embedding for `user_id`.
    fn put(&self, user_id: &str, embedding: &Embedding) -> Result<(), StoreError>;

    /// Returns the embedding for `user_id`, if enrolled.
    fn get(&self, user_id: &str) -> Result<Option<Embedding>, StoreError>;

    /// Returns every record, sorted by user id.
    fn all(&self) -> Result<Vec<(String, Embedding)>, StoreError>;

    /// Returns the number of enrolled users.
    fn len(&self) -> Result<usize, StoreError>;

    /// Returns true if nobody is enrolled.
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Checks that `user_id` can be used as a store key.
///
/// Keys are also file names for [`FileStore`](crate::FileStore): they must
/// be non-empty, at most [`MAX_USER_ID_LEN`] bytes, must not start with a
/// dot and must not contain path separators or NUL.
pub fn check_user_id(user_id: &str) -> Result<(), &'static str> {
    if user_id.is_empty() {
        return Err("empty");
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err("too long");
    }
    if user_id.starts_with('.') {
        return Err("starts with '.'");
    }
    if user_id.contains(['/', '\\', '\0']) {
        return Err("contains a path separator or NUL");
    }
    Ok(())
}

/// In-memory [`EnrollmentStore`].
/// Data is lost on restart. Suitable for testing or ephemeral use.
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Embedding>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrollmentStore for MemoryStore {
    fn put(&self, user_id: &str, embedding: &Embedding) -> Result<(), StoreError> {
        check_user_id(user_id).map_err(|_| StoreError::InvalidKey(user_id.to_string()))?;
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        records.insert(user_id.to_string(), embedding.clone());
        Ok(())
    }

    fn get(&self, user_id: &str) -> Result<Option<Embedding>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(records.get(user_id).cloned())
    }

    fn all(&self) -> Result<Vec<(String, Embedding)>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(records
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(records.len())
    }
}
