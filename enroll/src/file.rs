//! Directory-backed [`EnrollmentStore`]: one `<user_id>.emb` file per user.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use voxgate_voiceprint::Embedding;

use crate::codec;
use crate::error::StoreError;
use crate::store::{EnrollmentStore, check_user_id};

const EXTENSION: &str = "emb";

/// Stores each embedding in its own file under a directory.
///
/// Writes go to a hidden temporary file which is synced and then renamed
/// over the target, so readers see either the old record or the new one.
/// Hidden files and files without the `.emb` extension are ignored.
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
    seq: AtomicU64,
}

impl FileStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tracing::debug!(dir = %dir.display(), "enroll: opened file store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
            seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.{EXTENSION}"))
    }

    fn temp_path_for(&self, user_id: &str) -> PathBuf {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{user_id}.{}.{seq}.tmp", std::process::id()))
    }

    /// Lists `(user_id, path)` for every record file, sorted by user id.
    fn list(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(user_id) = name.strip_suffix(".emb") else {
                tracing::debug!(file = name, "enroll: skipping foreign file");
                continue;
            };
            if check_user_id(user_id).is_err() {
                tracing::debug!(file = name, "enroll: skipping file with invalid user id");
                continue;
            }
            let is_file = entry
                .file_type()
                .map_err(|e| StoreError::io(&path, e))?
                .is_file();
            if !is_file {
                continue;
            }
            out.push((user_id.to_string(), path));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn read_record(&self, user_id: &str, path: &Path) -> Result<Embedding, StoreError> {
        let data = fs::read(path).map_err(|e| StoreError::io(path, e))?;
        codec::decode(&data).map_err(|source| StoreError::Corrupt {
            key: user_id.to_string(),
            source,
        })
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl EnrollmentStore for FileStore {
    fn put(&self, user_id: &str, embedding: &Embedding) -> Result<(), StoreError> {
        check_user_id(user_id).map_err(|_| StoreError::InvalidKey(user_id.to_string()))?;

        let data = codec::encode(embedding);
        let target = self.path_for(user_id);
        let temp = self.temp_path_for(user_id);

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if let Err(e) = write_synced(&temp, &data) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::io(&temp, e));
        }
        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::io(&target, e));
        }
        Ok(())
    }

    fn get(&self, user_id: &str) -> Result<Option<Embedding>, StoreError> {
        if check_user_id(user_id).is_err() {
            return Ok(None);
        }
        let path = self.path_for(user_id);
        match self.read_record(user_id, &path) {
            Ok(embedding) => Ok(Some(embedding)),
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn all(&self) -> Result<Vec<(String, Embedding)>, StoreError> {
        let mut records = Vec::new();
        for (user_id, path) in self.list()? {
            match self.read_record(&user_id, &path) {
                Ok(embedding) => records.push((user_id, embedding)),
                // Removed between listing and reading.
                Err(StoreError::Io { source, .. })
                    if source.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }
}
