use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use coach_core::model::{
    MilestonePatch, Profile, SessionId, SessionRecord, SurveyKind, SurveyResponse, UserId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A profile together with the user it belongs to.
///
/// `Profile` itself carries no key; listings need both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub user_id: UserId,
    pub profile: Profile,
}

impl ProfileRow {
    #[must_use]
    pub fn new(user_id: UserId, profile: Profile) -> Self {
        Self { user_id, profile }
    }
}

/// Repository contract for participant profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a profile, `None` when the user has no row yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError>;

    /// Persist or replace a profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, user_id: UserId, profile: &Profile) -> Result<(), StorageError>;

    /// Apply a partial milestone edit and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no profile row.
    async fn apply_milestone_patch(
        &self,
        user_id: UserId,
        patch: &MilestonePatch,
    ) -> Result<Profile, StorageError>;

    /// List profiles for the admin panel.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_profiles(&self, limit: u32) -> Result<Vec<ProfileRow>, StorageError>;
}

/// Repository contract for recorded sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists.
    async fn insert_session(&self, session: &SessionRecord) -> Result<(), StorageError>;

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_session(&self, id: SessionId) -> Result<SessionRecord, StorageError>;

    /// Replace a session row (status transition, audio attachment).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    async fn update_session(&self, session: &SessionRecord) -> Result<(), StorageError>;

    /// List a user's sessions, most recently started first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError>;

    /// Count the user's completed non-baseline sessions.
    ///
    /// This is the journey evaluator's second input; baseline recordings
    /// and unfinished uploads never count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn count_completed_sessions(&self, user_id: UserId) -> Result<u32, StorageError>;
}

/// Repository contract for survey responses.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Append a response, returning its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the response cannot be stored.
    async fn append_response(&self, response: &SurveyResponse) -> Result<i64, StorageError>;

    /// The latest response of the given kind, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn latest_response(
        &self,
        user_id: UserId,
        kind: SurveyKind,
    ) -> Result<Option<SurveyResponse>, StorageError>;
}

/// Repository contract for the staff role table.
#[async_trait]
pub trait AdminRoleRepository: Send + Sync {
    /// Whether the user holds the admin role.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError>;

    /// Number of users holding the admin role.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn count_admins(&self) -> Result<u32, StorageError>;

    /// Grant the admin role; granting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the grant cannot be stored.
    async fn grant_admin(&self, user_id: UserId, granted_at: DateTime<Utc>)
        -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
    sessions: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
    surveys: Arc<Mutex<Vec<SurveyResponse>>>,
    admins: Arc<Mutex<HashSet<UserId>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, user_id: UserId, profile: &Profile) -> Result<(), StorageError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user_id, profile.clone());
        Ok(())
    }

    async fn apply_milestone_patch(
        &self,
        user_id: UserId,
        patch: &MilestonePatch,
    ) -> Result<Profile, StorageError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let profile = guard.get_mut(&user_id).ok_or(StorageError::NotFound)?;
        patch.apply(profile);
        Ok(profile.clone())
    }

    async fn list_profiles(&self, limit: u32) -> Result<Vec<ProfileRow>, StorageError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<ProfileRow> = guard
            .iter()
            .map(|(user_id, profile)| ProfileRow::new(*user_id, profile.clone()))
            .collect();
        rows.sort_by_key(|row| row.user_id);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&session.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(session.id(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<SessionRecord, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn update_session(&self, session: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if !guard.contains_key(&session.id()) {
            return Err(StorageError::NotFound);
        }
        guard.insert(session.id(), session.clone());
        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut sessions: Vec<SessionRecord> = guard
            .values()
            .filter(|s| s.user_id() == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| std::cmp::Reverse((s.started_at(), s.id())));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn count_completed_sessions(&self, user_id: UserId) -> Result<u32, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let count = guard
            .values()
            .filter(|s| s.user_id() == user_id && s.counts_toward_program())
            .count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }
}

#[async_trait]
impl SurveyRepository for InMemoryRepository {
    async fn append_response(&self, response: &SurveyResponse) -> Result<i64, StorageError> {
        let mut guard = self
            .surveys
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(response.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("row overflow".into()))
    }

    async fn latest_response(
        &self,
        user_id: UserId,
        kind: SurveyKind,
    ) -> Result<Option<SurveyResponse>, StorageError> {
        let guard = self
            .surveys
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user_id() == user_id && r.kind() == kind)
            .max_by_key(|(index, r)| (r.submitted_at(), *index))
            .map(|(_, r)| r.clone()))
    }
}

#[async_trait]
impl AdminRoleRepository for InMemoryRepository {
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        let guard = self
            .admins
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains(&user_id))
    }

    async fn count_admins(&self) -> Result<u32, StorageError> {
        let guard = self
            .admins
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        u32::try_from(guard.len()).map_err(|_| StorageError::Serialization("count overflow".into()))
    }

    async fn grant_admin(
        &self,
        user_id: UserId,
        _granted_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .admins
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user_id);
        Ok(())
    }
}

/// Aggregates the program repositories behind trait objects so backends
/// can be swapped per environment.
#[derive(Clone)]
pub struct Storage {
    pub profiles: Arc<dyn ProfileRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub surveys: Arc<dyn SurveyRepository>,
    pub admin_roles: Arc<dyn AdminRoleRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            profiles: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            surveys: Arc::new(repo.clone()),
            admin_roles: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::model::{SessionStatus, SurveyAnswer};
    use coach_core::time::fixed_now;

    #[tokio::test]
    async fn milestone_patch_requires_existing_profile() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let patch = MilestonePatch {
            masterclass_attended: Some(true),
            ..MilestonePatch::default()
        };

        let err = repo.apply_milestone_patch(user, &patch).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));

        repo.upsert_profile(user, &Profile::default()).await.unwrap();
        let updated = repo.apply_milestone_patch(user, &patch).await.unwrap();
        assert!(updated.masterclass_attended);
    }

    #[tokio::test]
    async fn completed_count_skips_baseline_and_unfinished() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let now = fixed_now();

        let mut baseline = SessionRecord::start(SessionId::generate(), user, true, now);
        baseline.complete(now + chrono::Duration::minutes(10)).unwrap();
        repo.insert_session(&baseline).await.unwrap();

        for offset in 0..2 {
            let mut session = SessionRecord::start(
                SessionId::generate(),
                user,
                false,
                now + chrono::Duration::hours(offset),
            );
            session
                .complete(now + chrono::Duration::hours(offset) + chrono::Duration::minutes(30))
                .unwrap();
            repo.insert_session(&session).await.unwrap();
        }

        let pending = SessionRecord::start(SessionId::generate(), user, false, now);
        repo.insert_session(&pending).await.unwrap();
        assert_eq!(pending.status(), SessionStatus::Processing);

        assert_eq!(repo.count_completed_sessions(user).await.unwrap(), 2);

        let other = UserId::generate();
        assert_eq!(repo.count_completed_sessions(other).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_session_insert_conflicts() {
        let repo = InMemoryRepository::new();
        let session =
            SessionRecord::start(SessionId::generate(), UserId::generate(), false, fixed_now());
        repo.insert_session(&session).await.unwrap();
        let err = repo.insert_session(&session).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn latest_response_picks_newest_of_kind() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let now = fixed_now();
        let answers = vec![SurveyAnswer::new("q1", "3")];

        let early = SurveyResponse::new(user, SurveyKind::Post, now, answers.clone()).unwrap();
        let late = SurveyResponse::new(
            user,
            SurveyKind::Post,
            now + chrono::Duration::days(1),
            answers.clone(),
        )
        .unwrap();
        let intake = SurveyResponse::new(user, SurveyKind::Intake, now, answers).unwrap();

        repo.append_response(&early).await.unwrap();
        repo.append_response(&late).await.unwrap();
        repo.append_response(&intake).await.unwrap();

        let latest = repo
            .latest_response(user, SurveyKind::Post)
            .await
            .unwrap()
            .expect("post response");
        assert_eq!(latest.submitted_at(), late.submitted_at());
    }

    #[tokio::test]
    async fn admin_grants_are_idempotent() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        assert!(!repo.is_admin(user).await.unwrap());
        assert_eq!(repo.count_admins().await.unwrap(), 0);

        repo.grant_admin(user, fixed_now()).await.unwrap();
        repo.grant_admin(user, fixed_now()).await.unwrap();

        assert!(repo.is_admin(user).await.unwrap());
        assert_eq!(repo.count_admins().await.unwrap(), 1);
    }
}
