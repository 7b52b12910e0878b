//! Session Store: one SQLite row per analysis plus the extracted text,
//! bucketed by URL in a sled database.

mod content;
mod error;
mod manager;
mod sessions;
mod types;

pub use content::{bucket_name, ContentStore};
pub use error::StorageError;
pub use manager::DatabaseManager;
pub use sessions::SessionStore;
pub use types::{ContentEntry, SessionRecord, SessionSummary, StoredSession};

pub type Result<T> = std::result::Result<T, StorageError>;
