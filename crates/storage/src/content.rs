use crate::types::ContentEntry;
use crate::Result;
use sha2::{Digest, Sha256};
use sled::{Config, Db};
use std::path::Path;
use tracing::{debug, info, warn};

/// Bucket (sled tree) name for a URL: `url_` + first 16 bytes of its SHA-256.
pub fn bucket_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex: String = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();
    format!("url_{}", hex)
}

/// Extracted page text, one tree per URL, keyed by session id.
pub struct ContentStore {
    db: Db,
}

impl ContentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Config::new()
            .path(path.as_ref())
            .cache_capacity(16 * 1024 * 1024)
            .flush_every_ms(Some(2000))
            .mode(sled::Mode::HighThroughput)
            .open()?;

        info!(path = ?path.as_ref(), recovered = db.was_recovered(), "Opened content store");
        Ok(Self { db })
    }

    pub fn temporary() -> Result<Self> {
        let db = Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn put(&self, entry: &ContentEntry) -> Result<()> {
        let tree = self.db.open_tree(bucket_name(&entry.url))?;
        let value = bincode::serialize(entry)?;
        tree.insert(entry.session_id.as_bytes(), value)?;

        debug!(
            session_id = %entry.session_id,
            bucket = %bucket_name(&entry.url),
            chars = entry.content.chars().count(),
            "Stored content entry"
        );
        Ok(())
    }

    pub fn get(&self, url: &str, session_id: &str) -> Result<Option<ContentEntry>> {
        let bucket = bucket_name(url);
        if !self.has_bucket(&bucket) {
            return Ok(None);
        }

        let tree = self.db.open_tree(bucket)?;
        match tree.get(session_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// All entries for a URL, oldest first. Undecodable values are skipped.
    pub fn entries_for_url(&self, url: &str) -> Result<Vec<ContentEntry>> {
        let bucket = bucket_name(url);
        if !self.has_bucket(&bucket) {
            return Ok(Vec::new());
        }

        let tree = self.db.open_tree(bucket)?;
        let mut entries = Vec::new();
        for item in tree.iter() {
            let (key, value) = item?;
            match bincode::deserialize::<ContentEntry>(&value) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(key = %String::from_utf8_lossy(&key), error = %e, "Skipping corrupt content entry"),
            }
        }

        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    /// Number of URL buckets.
    pub fn bucket_count(&self) -> usize {
        self.db
            .tree_names()
            .iter()
            .filter(|name| name.starts_with(b"url_"))
            .count()
    }

    fn has_bucket(&self, bucket: &str) -> bool {
        self.db
            .tree_names()
            .iter()
            .any(|name| {
                let name: &[u8] = name;
                name == bucket.as_bytes()
            })
    }

    pub fn flush(&self) -> Result<()> {
        let bytes = self.db.flush()?;
        debug!(bytes, "Flushed content store");
        Ok(())
    }
}
