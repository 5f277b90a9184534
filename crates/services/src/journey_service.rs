use std::sync::Arc;

use coach_core::journey::{self, JourneyProgress};
use coach_core::model::UserId;
use storage::repository::{ProfileRepository, SessionRepository};

use crate::error::JourneyError;

/// Read-only projection of a participant's journey state.
///
/// Recomputed from the persisted profile and session rows on every call;
/// there is no cache here, so a caller always sees the latest snapshot
/// its query layer provides. Both inputs are injected through the
/// repositories, which keeps the evaluation deterministic in tests.
#[derive(Clone)]
pub struct JourneyService {
    profiles: Arc<dyn ProfileRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl JourneyService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { profiles, sessions }
    }

    /// Evaluate the milestone chain for a user.
    ///
    /// A user without a profile row (registration still in flight) gets
    /// the fresh-participant default: baseline current, everything else
    /// locked.
    ///
    /// # Errors
    ///
    /// Returns `JourneyError::Storage` on repository failures.
    pub async fn progress_for(&self, user_id: UserId) -> Result<JourneyProgress, JourneyError> {
        let profile = self.profiles.get_profile(user_id).await?;
        let session_count = self.sessions.count_completed_sessions(user_id).await?;
        Ok(journey::evaluate(profile.as_ref(), session_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use coach_core::journey::{Milestone, MilestoneStatus};
    use coach_core::model::{Profile, SessionId, SessionRecord};
    use coach_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> JourneyService {
        JourneyService::new(Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn missing_profile_yields_default_state() {
        let repo = InMemoryRepository::new();
        let progress = service(&repo).progress_for(UserId::generate()).await.unwrap();

        assert_eq!(progress.baseline, MilestoneStatus::Current);
        assert_eq!(progress.launch_huddle, MilestoneStatus::Locked);
        assert_eq!(progress.session_count, 0);
    }

    #[tokio::test]
    async fn progress_reflects_persisted_snapshot() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let now = fixed_now();

        repo.upsert_profile(
            user,
            &Profile {
                baseline_completed: true,
                masterclass_attended: true,
                ..Profile::default()
            },
        )
        .await
        .unwrap();

        for hours in 0..3 {
            let mut session = SessionRecord::start(
                SessionId::generate(),
                user,
                false,
                now + chrono::Duration::hours(hours),
            );
            session
                .complete(now + chrono::Duration::hours(hours) + chrono::Duration::minutes(50))
                .unwrap();
            repo.insert_session(&session).await.unwrap();
        }

        let progress = service(&repo).progress_for(user).await.unwrap();
        assert_eq!(progress.session_count, 3);
        assert_eq!(progress.sessions, MilestoneStatus::Complete);
        assert_eq!(progress.current(), Some(Milestone::PostSurvey));
    }

    #[tokio::test]
    async fn repeated_evaluation_is_stable() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        repo.upsert_profile(user, &Profile::default()).await.unwrap();

        let svc = service(&repo);
        let first = svc.progress_for(user).await.unwrap();
        let second = svc.progress_for(user).await.unwrap();
        assert_eq!(first, second);
    }
}
