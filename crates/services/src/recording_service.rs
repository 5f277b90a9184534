use std::sync::Arc;

use coach_core::Clock;
use coach_core::model::{SessionId, SessionRecord, UserId};
use storage::repository::{ProfileRepository, SessionRepository};

use crate::error::RecordingError;

/// Session-recording workflow: start, attach audio, complete or fail.
///
/// Completing a baseline recording is what flips the profile's
/// `baseline_completed` flag; regular sessions instead feed the
/// completed-session count the journey evaluator reads. This service is
/// one of the upstream writers trusted to keep those flags monotonic.
#[derive(Clone)]
pub struct RecordingService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl RecordingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            profiles,
            sessions,
        }
    }

    /// Start a new recording for the user.
    ///
    /// # Errors
    ///
    /// Returns `RecordingError::Storage` on repository failures.
    pub async fn start_session(
        &self,
        user_id: UserId,
        is_baseline: bool,
    ) -> Result<SessionRecord, RecordingError> {
        let session = SessionRecord::start(
            SessionId::generate(),
            user_id,
            is_baseline,
            self.clock.now(),
        );
        self.sessions.insert_session(&session).await?;
        Ok(session)
    }

    /// Mark an uploaded session completed, optionally attaching the
    /// stored recording's object key.
    ///
    /// # Errors
    ///
    /// Returns `RecordingError::WrongUser` if the session belongs to a
    /// different user, `RecordingError::Session` for invalid transitions,
    /// or `RecordingError::Storage` on repository failures.
    pub async fn complete_session(
        &self,
        user_id: UserId,
        session_id: SessionId,
        audio_object: Option<String>,
    ) -> Result<SessionRecord, RecordingError> {
        let mut session = self.sessions.get_session(session_id).await?;
        if session.user_id() != user_id {
            return Err(RecordingError::WrongUser);
        }

        if let Some(object) = audio_object {
            session.set_audio_object(object);
        }
        session.complete(self.clock.now())?;
        self.sessions.update_session(&session).await?;

        if session.is_baseline() {
            self.mark_baseline_completed(user_id).await?;
        }

        Ok(session)
    }

    /// Mark a session failed (upload error, pipeline rejection).
    ///
    /// # Errors
    ///
    /// Returns `RecordingError::WrongUser` if the session belongs to a
    /// different user, or `RecordingError::Storage` on repository
    /// failures.
    pub async fn fail_session(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> Result<SessionRecord, RecordingError> {
        let mut session = self.sessions.get_session(session_id).await?;
        if session.user_id() != user_id {
            return Err(RecordingError::WrongUser);
        }
        session.fail();
        self.sessions.update_session(&session).await?;
        Ok(session)
    }

    /// The profile row may not exist yet if registration write-behind is
    /// still in flight; completing the baseline creates it then.
    async fn mark_baseline_completed(&self, user_id: UserId) -> Result<(), RecordingError> {
        let mut profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .unwrap_or_default();
        profile.baseline_completed = true;
        self.profiles.upsert_profile(user_id, &profile).await?;
        Ok(())
    }
}
