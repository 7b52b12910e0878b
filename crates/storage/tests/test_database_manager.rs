use storage::{bucket_name, DatabaseManager, SessionRecord, SessionSummary};
use tempfile::TempDir;

fn record(id: &str, url: &str, text: &str) -> SessionRecord {
    SessionRecord {
        session_id: id.to_string(),
        url: url.to_string(),
        readability: format!("{} readability", text),
        structure: format!("{} structure", text),
        completeness: format!("{} completeness", text),
        style: format!("{} style", text),
    }
}

#[tokio::test]
async fn test_save_then_get_round_trips_all_fields() {
    let dir = TempDir::new().expect("tempdir");
    let db = DatabaseManager::new(dir.path()).await.expect("open");

    let saved = record("3f1c", "https://docs.example.com/push", "## Assessment\nOK");
    db.save(&saved, "Hello world.", Some(77.91)).await.expect("save");

    assert_eq!(db.get_session("3f1c").await.expect("get"), Some(saved.clone()));
    assert_eq!(db.get_session("nope").await.expect("get"), None);

    let entry = db
        .content_for(&saved.url, &saved.session_id)
        .expect("content")
        .expect("entry present");
    assert_eq!(entry.content, "Hello world.");
    assert_eq!(entry.readability_score, Some(77.91));
}

#[tokio::test]
async fn test_recent_is_prefix_of_all_sessions() {
    let dir = TempDir::new().expect("tempdir");
    let db = DatabaseManager::new(dir.path()).await.expect("open");

    for i in 0..7 {
        let url = format!("https://docs.example.com/page{}", i % 3);
        db.save(&record(&format!("id-{}", i), &url, "x"), "text", None)
            .await
            .expect("save");
    }

    let all = db.all_sessions().await.expect("all");
    assert_eq!(all.len(), 7);
    assert_eq!(all[0].record.session_id, "id-6");
    assert!(all.windows(2).all(|w| w[0].seq > w[1].seq));

    let recent = db.recent_sessions(5).await.expect("recent");
    assert_eq!(recent.len(), 5);
    let prefix: Vec<_> = all
        .iter()
        .take(5)
        .map(|s| SessionSummary {
            seq: s.seq,
            session_id: s.record.session_id.clone(),
            url: s.record.url.clone(),
        })
        .collect();
    assert_eq!(recent, prefix);

    assert_eq!(db.recent_sessions(50).await.expect("recent").len(), 7);
    assert_eq!(db.session_count().await.expect("count"), 7);
}

#[tokio::test]
async fn test_same_url_shares_one_bucket() {
    let db = DatabaseManager::ephemeral().expect("open");
    let url = "https://docs.example.com/push";

    db.save(&record("a", url, "first"), "v1", None).await.expect("save");
    db.save(&record("b", url, "second"), "v2", Some(40.0)).await.expect("save");
    db.save(&record("c", "https://docs.example.com/other", "third"), "v3", None)
        .await
        .expect("save");

    let entries = db.contents_for_url(url).expect("contents");
    let contents: Vec<_> = entries.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["v1", "v2"]);
    assert_eq!(db.content_bucket_count(), 2);
    assert_ne!(bucket_name(url), bucket_name("https://docs.example.com/other"));
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().expect("tempdir");

    {
        let db = DatabaseManager::new(dir.path()).await.expect("open");
        db.save(&record("keep", "https://x.test", "persisted"), "body", None)
            .await
            .expect("save");
        db.shutdown().expect("shutdown");
    }

    let db = DatabaseManager::new(dir.path()).await.expect("reopen");
    let loaded = db.get_session("keep").await.expect("get").expect("present");
    assert_eq!(loaded.readability, "persisted readability");
    assert!(db.sessions_path().exists());
    assert!(db.content_path().is_dir());
}
