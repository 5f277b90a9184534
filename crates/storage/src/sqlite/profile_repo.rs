use async_trait::async_trait;
use sqlx::Row;

use coach_core::model::{MilestonePatch, Profile, UserId};

use super::SqliteRepository;
use super::mapping::{map_profile_row, ser, user_id_from_text};
use crate::repository::{ProfileRepository, ProfileRow, StorageError};

const PROFILE_COLUMNS: &str = r"
    user_id, baseline_completed, masterclass_attended, post_survey_completed,
    final_report_status, launch_huddle_attended,
    masterclass_datetime, masterclass_location,
    launch_huddle_datetime, launch_huddle_location
";

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1");
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn upsert_profile(&self, user_id: UserId, profile: &Profile) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profiles (
                    user_id, baseline_completed, masterclass_attended,
                    post_survey_completed, final_report_status,
                    launch_huddle_attended, masterclass_datetime,
                    masterclass_location, launch_huddle_datetime,
                    launch_huddle_location
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(user_id) DO UPDATE SET
                    baseline_completed = excluded.baseline_completed,
                    masterclass_attended = excluded.masterclass_attended,
                    post_survey_completed = excluded.post_survey_completed,
                    final_report_status = excluded.final_report_status,
                    launch_huddle_attended = excluded.launch_huddle_attended,
                    masterclass_datetime = excluded.masterclass_datetime,
                    masterclass_location = excluded.masterclass_location,
                    launch_huddle_datetime = excluded.launch_huddle_datetime,
                    launch_huddle_location = excluded.launch_huddle_location
            ",
        )
        .bind(user_id.to_string())
        .bind(profile.baseline_completed)
        .bind(profile.masterclass_attended)
        .bind(profile.post_survey_completed)
        .bind(profile.final_report_status.as_str())
        .bind(profile.launch_huddle_attended)
        .bind(profile.masterclass_datetime.as_deref())
        .bind(profile.masterclass_location.as_deref())
        .bind(profile.launch_huddle_datetime.as_deref())
        .bind(profile.launch_huddle_location.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn apply_milestone_patch(
        &self,
        user_id: UserId,
        patch: &MilestonePatch,
    ) -> Result<Profile, StorageError> {
        let mut profile = self
            .get_profile(user_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        patch.apply(&mut profile);
        self.upsert_profile(user_id, &profile).await?;
        Ok(profile)
    }

    async fn list_profiles(&self, limit: u32) -> Result<Vec<ProfileRow>, StorageError> {
        let sql =
            format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY user_id ASC LIMIT ?1");
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_id: String = row.try_get("user_id").map_err(ser)?;
            out.push(ProfileRow::new(
                user_id_from_text(&raw_id)?,
                map_profile_row(&row)?,
            ));
        }
        Ok(out)
    }
}
