use crate::content::ContentStore;
use crate::error::StorageError;
use crate::sessions::SessionStore;
use crate::types::{ContentEntry, SessionRecord, SessionSummary, StoredSession};
use crate::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SESSIONS_FILE: &str = "sessions.db";
const CONTENT_DIR: &str = "content";

/// Owns both stores under one base directory.
///
/// Writes go to SQLite first and then to the content store. The two writes
/// are not atomic: a content failure after a successful row insert leaves the
/// row in place and is reported to the caller.
pub struct DatabaseManager {
    base_path: PathBuf,
    sessions: SessionStore,
    content: ContentStore,
}

impl DatabaseManager {
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        let content_path = base_path.join(CONTENT_DIR);

        for dir in [&base_path, &content_path] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::Io {
                    path: dir.clone(),
                    source,
                })?;
        }

        let sessions = SessionStore::open(base_path.join(SESSIONS_FILE)).await?;
        let content = ContentStore::open(&content_path)?;

        info!(path = ?base_path, "Session store ready");
        Ok(Self {
            base_path,
            sessions,
            content,
        })
    }

    /// In-memory SQLite plus a temporary sled database.
    pub fn ephemeral() -> Result<Self> {
        Ok(Self {
            base_path: PathBuf::new(),
            sessions: SessionStore::in_memory()?,
            content: ContentStore::temporary()?,
        })
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.base_path.join(SESSIONS_FILE)
    }

    pub fn content_path(&self) -> PathBuf {
        self.base_path.join(CONTENT_DIR)
    }

    /// Persist one analysis: the session row and its extracted text.
    pub async fn save(
        &self,
        record: &SessionRecord,
        content: &str,
        readability_score: Option<f64>,
    ) -> Result<()> {
        let seq = self.sessions.insert(record).await?;

        let entry = ContentEntry {
            session_id: record.session_id.clone(),
            url: record.url.clone(),
            content: content.to_string(),
            readability_score,
            created_at: Utc::now(),
        };
        self.content.put(&entry)?;

        info!(session_id = %record.session_id, url = %record.url, seq, "Saved analysis session");
        Ok(())
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        self.sessions.get(session_id).await
    }

    pub async fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        self.sessions.recent(limit).await
    }

    pub async fn all_sessions(&self) -> Result<Vec<StoredSession>> {
        self.sessions.all().await
    }

    pub async fn session_count(&self) -> Result<usize> {
        self.sessions.count().await
    }

    pub fn content_for(&self, url: &str, session_id: &str) -> Result<Option<ContentEntry>> {
        self.content.get(url, session_id)
    }

    pub fn contents_for_url(&self, url: &str) -> Result<Vec<ContentEntry>> {
        self.content.entries_for_url(url)
    }

    pub fn content_bucket_count(&self) -> usize {
        self.content.bucket_count()
    }

    pub fn shutdown(&self) -> Result<()> {
        debug!("Flushing session store");
        self.content.flush()?;
        info!("Session store closed");
        Ok(())
    }
}
