//! Session persistence

pub mod record;
pub mod sessions;

use uuid::Uuid;

pub use sessions::SessionStore;

/// Session store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode session record: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Stored session {session_id} is corrupt: {reason}")]
    Corrupt { session_id: Uuid, reason: String },
}
