//! Integration test for the preference store lifecycle.
//!
//! Exercises: open, migrate, save/load round trip, reopen, overwrite.

use critique_core::prefs::{PreferenceStore, RESPONSE_LANGUAGE_KEY};

fn temp_store_path() -> std::path::PathBuf {
    let dir = tempfile::TempDir::new().unwrap();
    dir.keep().join("nested").join("critique.db")
}

#[tokio::test]
async fn response_language_survives_reopen() {
    let path = temp_store_path();

    let store = PreferenceStore::open(&path).await.unwrap();
    assert_eq!(store.load_response_language().await.unwrap(), None, "fresh store is empty");

    store.save_response_language("ru").await.unwrap();
    assert_eq!(store.load_response_language().await.unwrap().as_deref(), Some("ru"));
    drop(store);

    let reopened = PreferenceStore::open(&path).await.unwrap();
    assert_eq!(
        reopened.load_response_language().await.unwrap().as_deref(),
        Some("ru"),
        "value should survive a reopen"
    );
}

#[tokio::test]
async fn save_overwrites_and_accepts_unknown_tags() {
    let path = temp_store_path();
    let store = PreferenceStore::open(&path).await.unwrap();

    store.save_response_language("en").await.unwrap();
    store.save_response_language("tlh-Klingon").await.unwrap();
    assert_eq!(
        store.load_response_language().await.unwrap().as_deref(),
        Some("tlh-Klingon"),
        "stored values are not validated"
    );
}

#[tokio::test]
async fn empty_value_reads_back_as_absent() {
    let path = temp_store_path();
    let store = PreferenceStore::open(&path).await.unwrap();

    store.save_response_language("").await.unwrap();
    assert_eq!(store.load_response_language().await.unwrap(), None);
}

#[tokio::test]
async fn schema_is_migrated_once() {
    let path = temp_store_path();
    drop(PreferenceStore::open(&path).await.unwrap());
    drop(PreferenceStore::open(&path).await.unwrap());

    let conn = rusqlite::Connection::open(&path).unwrap();
    let versions: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
        .unwrap();
    assert_eq!(versions, 1, "reopening must not re-apply v1");

    let journal: String = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0)).unwrap();
    assert_eq!(journal, "wal");

    let key: String = conn
        .query_row(
            "SELECT name FROM pragma_table_info('preferences') WHERE pk = 1",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(key, "key");
    assert_eq!(RESPONSE_LANGUAGE_KEY, "preferredResponseLanguage");
}
