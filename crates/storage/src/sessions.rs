use crate::types::{SessionRecord, SessionSummary, StoredSession};
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// SQLite table of analysis sessions. Rows are append-only.
pub struct SessionStore {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str =
    "SELECT rowid, session_id, url, readability, structure, completeness, style FROM sessions";

impl SessionStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // No primary key: session_id uniqueness comes from UUID generation
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT,
                url TEXT,
                readability TEXT,
                structure TEXT,
                completeness TEXT,
                style TEXT
            );
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn insert(&self, record: &SessionRecord) -> Result<i64> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO sessions (session_id, url, readability, structure, completeness, style)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.session_id,
                record.url,
                record.readability,
                record.structure,
                record.completeness,
                record.style,
            ],
        )?;

        let seq = conn.last_insert_rowid();
        debug!(session_id = %record.session_id, seq, "Inserted session row");
        Ok(seq)
    }

    /// Latest row wins if an id was ever written twice.
    pub async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE session_id = ?1 ORDER BY rowid DESC LIMIT 1",
            SELECT_COLUMNS
        ))?;

        let session = stmt
            .query_row(params![session_id], row_to_session)
            .optional()?;

        Ok(session.map(|s| s.record))
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT rowid, session_id, url FROM sessions ORDER BY rowid DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(SessionSummary {
                seq: row.get(0)?,
                session_id: row.get(1)?,
                url: row.get(2)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    pub async fn all(&self) -> Result<Vec<StoredSession>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!("{} ORDER BY rowid DESC", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    pub async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<StoredSession> {
    // Columns are nullable; treat NULL as empty text
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };

    Ok(StoredSession {
        seq: row.get(0)?,
        record: SessionRecord {
            session_id: text(1)?,
            url: text(2)?,
            readability: text(3)?,
            structure: text(4)?,
            completeness: text(5)?,
            style: text(6)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, url: &str) -> SessionRecord {
        SessionRecord {
            session_id: id.to_string(),
            url: url.to_string(),
            readability: format!("readability for {}", id),
            structure: "structure".to_string(),
            completeness: "completeness".to_string(),
            style: "style".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = SessionStore::in_memory().expect("store");
        store.insert(&record("a", "https://x.test")).await.expect("insert");

        let loaded = store.get("a").await.expect("get").expect("present");
        assert_eq!(loaded, record("a", "https://x.test"));
        assert!(store.get("missing").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_recent_orders_by_insertion() {
        let store = SessionStore::in_memory().expect("store");
        for id in ["first", "second", "third"] {
            store.insert(&record(id, "https://x.test")).await.expect("insert");
        }

        let recent = store.recent(2).await.expect("recent");
        let ids: Vec<_> = recent.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["third", "second"]);
        assert!(recent[0].seq > recent[1].seq);

        assert!(store.recent(0).await.expect("recent").is_empty());
        assert_eq!(store.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn test_null_columns_read_as_empty() {
        let store = SessionStore::in_memory().expect("store");
        {
            let conn = store.conn.lock().await;
            conn.execute(
                "INSERT INTO sessions (session_id, url) VALUES ('legacy', 'https://x.test')",
                [],
            )
            .expect("raw insert");
        }

        let loaded = store.get("legacy").await.expect("get").expect("present");
        assert_eq!(loaded.readability, "");
        assert_eq!(loaded.style, "");
    }
}
