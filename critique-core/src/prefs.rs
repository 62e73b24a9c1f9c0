//! Durable user preferences.
//!
//! The only preference today is the response language, stored under
//! [`RESPONSE_LANGUAGE_KEY`]. Values are accepted as-is: nothing checks them
//! against the languages the selector offers.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::error::StoreError;

/// Key under which the preferred response language is persisted.
pub const RESPONSE_LANGUAGE_KEY: &str = "preferredResponseLanguage";

/// Handle to the SQLite-backed preference table. Cheap to clone.
#[derive(Clone)]
pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    /// Opens (or creates) the store at `path`, creating parent directories,
    /// enabling WAL mode, and applying migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created, the file cannot
    /// be opened, or schema DDL fails.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let conn = Connection::open(path).await?;

        conn.call(|db| {
            db.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;",
            )?;
            db.busy_timeout(Duration::from_secs(5))?;
            crate::schema::migrate(db)?;
            Ok::<_, rusqlite::Error>(())
        })
        .await?;

        tracing::debug!(path = %path.display(), "preference store opened");
        Ok(Self { conn })
    }

    /// Persists the response-language selection, replacing any earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the upsert fails.
    pub async fn save_response_language(&self, value: &str) -> Result<(), StoreError> {
        self.set(RESPONSE_LANGUAGE_KEY, value).await
    }

    /// Reads back the saved response language.
    ///
    /// Returns `None` when nothing was saved or the saved value is empty, so the
    /// caller leaves its default untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn load_response_language(&self) -> Result<Option<String>, StoreError> {
        Ok(self.get(RESPONSE_LANGUAGE_KEY).await?.filter(|v| !v.is_empty()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_owned();
        let value = value.to_owned();

        self.conn
            .call(move |db| {
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO preferences (key, value, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key)
                     DO UPDATE SET value = excluded.value,
                                   updated_at = excluded.updated_at",
                    rusqlite::params![&key, &value, now_secs()],
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_owned();

        let value = self
            .conn
            .call(move |db| {
                db.query_row(
                    "SELECT value FROM preferences WHERE key = ?1",
                    rusqlite::params![&key],
                    |r| r.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        Ok(value)
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
