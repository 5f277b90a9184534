use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use coach_core::model::UserId;

use super::SqliteRepository;
use super::mapping::ser;
use crate::repository::{AdminRoleRepository, StorageError};

#[async_trait]
impl AdminRoleRepository for SqliteRepository {
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM admin_roles WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn count_admins(&self) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS admin_count FROM admin_roles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let count: i64 = row.try_get("admin_count").map_err(ser)?;
        u32::try_from(count)
            .map_err(|_| StorageError::Serialization(format!("invalid count: {count}")))
    }

    async fn grant_admin(
        &self,
        user_id: UserId,
        granted_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO admin_roles (user_id, granted_at)
                VALUES (?1, ?2)
                ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user_id.to_string())
        .bind(granted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
