use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{SessionId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("session is already completed")]
    AlreadyCompleted,
}

/// Lifecycle state of a recorded coaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Uploaded and waiting on the analysis pipeline.
    Processing,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Returns the persisted wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

/// A recorded teaching session.
///
/// Baseline recordings are kept apart from regular sessions: they flip the
/// profile's baseline flag when completed but never count toward the
/// session quota that unlocks the post-survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    id: SessionId,
    user_id: UserId,
    is_baseline: bool,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    audio_object: Option<String>,
}

impl SessionRecord {
    /// Starts a new recording in the `Processing` state.
    #[must_use]
    pub fn start(
        id: SessionId,
        user_id: UserId,
        is_baseline: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            is_baseline,
            status: SessionStatus::Processing,
            started_at,
            completed_at: None,
            audio_object: None,
        }
    }

    /// Rehydrates a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError::InvalidTimeRange` if `completed_at`
    /// precedes `started_at`.
    pub fn from_persisted(
        id: SessionId,
        user_id: UserId,
        is_baseline: bool,
        status: SessionStatus,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        audio_object: Option<String>,
    ) -> Result<Self, SessionRecordError> {
        if let Some(completed) = completed_at {
            if completed < started_at {
                return Err(SessionRecordError::InvalidTimeRange);
            }
        }
        Ok(Self {
            id,
            user_id,
            is_baseline,
            status,
            started_at,
            completed_at,
            audio_object,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.is_baseline
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn audio_object(&self) -> Option<&str> {
        self.audio_object.as_deref()
    }

    /// True if this session counts toward the program's session quota:
    /// completed and not a baseline recording.
    #[must_use]
    pub fn counts_toward_program(&self) -> bool {
        !self.is_baseline && self.status == SessionStatus::Completed
    }

    /// Attaches the object-storage key of the uploaded recording.
    pub fn set_audio_object(&mut self, object: String) {
        self.audio_object = Some(object);
    }

    /// Marks the session completed at the given time.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` for a second completion, or
    /// `InvalidTimeRange` if `at` precedes the session start.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), SessionRecordError> {
        if self.status == SessionStatus::Completed {
            return Err(SessionRecordError::AlreadyCompleted);
        }
        if at < self.started_at {
            return Err(SessionRecordError::InvalidTimeRange);
        }
        self.status = SessionStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Marks the session as failed (upload or pipeline error).
    pub fn fail(&mut self) {
        self.status = SessionStatus::Failed;
        self.completed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn started() -> SessionRecord {
        SessionRecord::start(
            SessionId::generate(),
            UserId::generate(),
            false,
            fixed_now(),
        )
    }

    #[test]
    fn started_session_is_processing_and_does_not_count() {
        let session = started();
        assert_eq!(session.status(), SessionStatus::Processing);
        assert!(session.completed_at().is_none());
        assert!(!session.counts_toward_program());
    }

    #[test]
    fn completed_regular_session_counts_toward_program() {
        let mut session = started();
        session
            .complete(fixed_now() + chrono::Duration::minutes(25))
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.counts_toward_program());
    }

    #[test]
    fn completed_baseline_session_never_counts() {
        let mut session = SessionRecord::start(
            SessionId::generate(),
            UserId::generate(),
            true,
            fixed_now(),
        );
        session
            .complete(fixed_now() + chrono::Duration::minutes(10))
            .unwrap();
        assert!(!session.counts_toward_program());
    }

    #[test]
    fn double_completion_is_rejected() {
        let mut session = started();
        let later = fixed_now() + chrono::Duration::minutes(5);
        session.complete(later).unwrap();
        assert_eq!(
            session.complete(later),
            Err(SessionRecordError::AlreadyCompleted)
        );
    }

    #[test]
    fn completion_before_start_is_rejected() {
        let mut session = started();
        let earlier = fixed_now() - chrono::Duration::minutes(1);
        assert_eq!(
            session.complete(earlier),
            Err(SessionRecordError::InvalidTimeRange)
        );
    }

    #[test]
    fn persisted_session_validates_time_range() {
        let err = SessionRecord::from_persisted(
            SessionId::generate(),
            UserId::generate(),
            false,
            SessionStatus::Completed,
            fixed_now(),
            Some(fixed_now() - chrono::Duration::seconds(1)),
            None,
        )
        .unwrap_err();
        assert_eq!(err, SessionRecordError::InvalidTimeRange);
    }
}
