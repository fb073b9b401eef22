//! Durable keyed storage for session state

use std::path::{Path, PathBuf};
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(test)]
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::game::session::SessionState;

use super::record::SessionRecord;
use super::StoreError;

/// Session store operations
#[derive(Clone)]
pub struct SessionStore {
    backend: Backend,
    /// Milliseconds the next `put` sleeps before writing
    #[cfg(test)]
    write_stall_ms: Arc<AtomicU64>,
}

#[derive(Clone)]
enum Backend {
    Memory(Arc<DashMap<Uuid, SessionRecord>>),
    File(Arc<PathBuf>),
}

impl SessionStore {
    /// Store kept in process memory
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
            #[cfg(test)]
            write_stall_ms: Arc::default(),
        }
    }

    /// Store with one JSON file per session under `dir`
    pub async fn file(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "Session store ready");
        Ok(Self {
            backend: Backend::File(Arc::new(dir)),
            #[cfg(test)]
            write_stall_ms: Arc::default(),
        })
    }

    /// Build the store selected by configuration
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        match config.store_backend {
            StoreBackend::Memory => Ok(Self::memory()),
            StoreBackend::File => Self::file(&config.session_dir).await,
        }
    }

    /// Insert or replace the record for `id`
    pub async fn put(&self, id: Uuid, state: &SessionState) -> Result<(), StoreError> {
        #[cfg(test)]
        {
            let stall = self.write_stall_ms.swap(0, Ordering::SeqCst);
            if stall > 0 {
                tokio::time::sleep(Duration::from_millis(stall)).await;
            }
        }

        let record = SessionRecord::from_state(id, state);
        match &self.backend {
            Backend::Memory(map) => {
                map.insert(id, record);
            }
            Backend::File(dir) => {
                let bytes = serde_json::to_vec(&record)?;
                let path = record_path(dir, id);
                let tmp = path.with_extension("json.tmp");
                // Write then rename so a reader never sees a half-written record
                tokio::fs::write(&tmp, bytes).await?;
                tokio::fs::rename(&tmp, &path).await?;
            }
        }
        Ok(())
    }

    /// Load the state stored under `id`
    pub async fn get(&self, id: Uuid) -> Result<Option<SessionState>, StoreError> {
        let record = match &self.backend {
            Backend::Memory(map) => map.get(&id).map(|r| r.value().clone()),
            Backend::File(dir) => match tokio::fs::read(record_path(dir, id)).await {
                Ok(bytes) => Some(serde_json::from_slice::<SessionRecord>(&bytes)?),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            },
        };

        record.map(SessionRecord::into_state).transpose()
    }

    /// Remove the record for `id`; removing a missing record is not an error
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.remove(&id);
            }
            Backend::File(dir) => match tokio::fs::remove_file(record_path(dir, id)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(session_id = %id, "No stored record to delete");
                }
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
impl SessionStore {
    /// Make the next write on any clone of this store take `by` longer
    pub(crate) fn stall_next_write(&self, by: Duration) {
        self.write_stall_ms.store(by.as_millis() as u64, Ordering::SeqCst);
    }
}

fn record_path(dir: &Path, id: Uuid) -> PathBuf {
    dir.join(format!("{}.json", id))
}
