use chrono::Utc;
use sqlx::Row;

use exam_core::model::ExamResult;

use super::SqliteRepository;
use crate::repository::{ExamResultRecord, HistoryRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Decode a stored payload, degrading to an empty history on any defect.
///
/// A payload that fails to parse, or parses but fails domain validation,
/// means the record is unusable as a whole; starting over beats failing the
/// caller's startup.
fn decode_history(name: &str, payload: &str) -> Vec<ExamResult> {
    let records: Vec<ExamResultRecord> = match serde_json::from_str(payload) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(record = %name, %err, "history payload is malformed, starting empty");
            return Vec::new();
        }
    };

    let mut history = Vec::with_capacity(records.len());
    for record in records {
        match record.into_result() {
            Ok(result) => history.push(result),
            Err(err) => {
                tracing::warn!(record = %name, %err, "history entry failed validation, starting empty");
                return Vec::new();
            }
        }
    }
    history
}

#[async_trait::async_trait]
impl HistoryRepository for SqliteRepository {
    async fn load_history(&self, name: &str) -> Result<Vec<ExamResult>, StorageError> {
        let row = sqlx::query("SELECT payload FROM history_records WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };
        let payload: String = row.try_get("payload").map_err(ser)?;

        Ok(decode_history(name, &payload))
    }

    async fn save_history(&self, name: &str, history: &[ExamResult]) -> Result<(), StorageError> {
        let records: Vec<ExamResultRecord> =
            history.iter().map(ExamResultRecord::from_result).collect();
        let payload = serde_json::to_string(&records).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO history_records (name, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(name)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
