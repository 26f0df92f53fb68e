use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

use super::SqliteRepository;

const PROGRESS_KEY: &str = "level_progress";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query("SELECT value, updated_at FROM app_state WHERE key = ?1")
            .bind(PROGRESS_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ProgressRecord {
            raw_value: row.try_get("value").map_err(ser)?,
            updated_at: row.try_get("updated_at").map_err(ser)?,
        }))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(PROGRESS_KEY)
        .bind(&record.raw_value)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
