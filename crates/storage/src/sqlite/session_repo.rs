use async_trait::async_trait;
use sqlx::Row;

use coach_core::model::{SessionId, SessionRecord, SessionStatus, UserId};

use super::SqliteRepository;
use super::mapping::{map_session_row, ser};
use crate::repository::{SessionRepository, StorageError};

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, session: &SessionRecord) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
                INSERT INTO sessions (
                    id, user_id, is_baseline, status,
                    started_at, completed_at, audio_object
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(session.id().to_string())
        .bind(session.user_id().to_string())
        .bind(session.is_baseline())
        .bind(session.status().as_str())
        .bind(session.started_at())
        .bind(session.completed_at())
        .bind(session.audio_object())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StorageError::Conflict)
            }
            Err(e) => Err(StorageError::Connection(e.to_string())),
        }
    }

    async fn get_session(&self, id: SessionId) -> Result<SessionRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, is_baseline, status,
                       started_at, completed_at, audio_object
                FROM sessions
                WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_session_row(&row)
    }

    async fn update_session(&self, session: &SessionRecord) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
                UPDATE sessions SET
                    status = ?2,
                    completed_at = ?3,
                    audio_object = ?4
                WHERE id = ?1
            ",
        )
        .bind(session.id().to_string())
        .bind(session.status().as_str())
        .bind(session.completed_at())
        .bind(session.audio_object())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, is_baseline, status,
                       started_at, completed_at, audio_object
                FROM sessions
                WHERE user_id = ?1
                ORDER BY started_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }

    async fn count_completed_sessions(&self, user_id: UserId) -> Result<u32, StorageError> {
        let row = sqlx::query(
            r"
                SELECT COUNT(*) AS session_count
                FROM sessions
                WHERE user_id = ?1 AND is_baseline = 0 AND status = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(SessionStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let count: i64 = row.try_get("session_count").map_err(ser)?;
        u32::try_from(count)
            .map_err(|_| StorageError::Serialization(format!("invalid count: {count}")))
    }
}
