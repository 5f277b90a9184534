use async_trait::async_trait;

use coach_core::model::{SurveyKind, SurveyResponse, UserId};

use super::SqliteRepository;
use super::mapping::{answers_to_json, map_survey_row};
use crate::repository::{StorageError, SurveyRepository};

#[async_trait]
impl SurveyRepository for SqliteRepository {
    async fn append_response(&self, response: &SurveyResponse) -> Result<i64, StorageError> {
        let answers = answers_to_json(response.answers())?;

        let res = sqlx::query(
            r"
                INSERT INTO survey_responses (user_id, kind, submitted_at, answers)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(response.user_id().to_string())
        .bind(response.kind().as_str())
        .bind(response.submitted_at())
        .bind(answers)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn latest_response(
        &self,
        user_id: UserId,
        kind: SurveyKind,
    ) -> Result<Option<SurveyResponse>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, kind, submitted_at, answers
                FROM survey_responses
                WHERE user_id = ?1 AND kind = ?2
                ORDER BY submitted_at DESC, id DESC
                LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_survey_row).transpose()
    }
}
