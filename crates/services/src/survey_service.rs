use std::sync::Arc;

use coach_core::Clock;
use coach_core::model::{SurveyAnswer, SurveyKind, SurveyResponse, UserId};
use storage::repository::{ProfileRepository, SurveyRepository};

use crate::error::SurveyServiceError;

/// Survey submission flow.
///
/// Responses append (re-submission keeps history); the post-survey is the
/// flow that flips `post_survey_completed`, and flipping it twice is a
/// no-op.
#[derive(Clone)]
pub struct SurveyService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    surveys: Arc<dyn SurveyRepository>,
}

impl SurveyService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        surveys: Arc<dyn SurveyRepository>,
    ) -> Self {
        Self {
            clock,
            profiles,
            surveys,
        }
    }

    /// Store an intake questionnaire. Touches no milestone flags.
    ///
    /// # Errors
    ///
    /// Returns `SurveyServiceError::Survey` for an empty submission, or
    /// `SurveyServiceError::Storage` on repository failures.
    pub async fn submit_intake(
        &self,
        user_id: UserId,
        answers: Vec<SurveyAnswer>,
    ) -> Result<(), SurveyServiceError> {
        let response =
            SurveyResponse::new(user_id, SurveyKind::Intake, self.clock.now(), answers)?;
        self.surveys.append_response(&response).await?;
        Ok(())
    }

    /// Store a post-survey submission and mark the milestone complete.
    ///
    /// # Errors
    ///
    /// Returns `SurveyServiceError::Survey` for an empty submission, or
    /// `SurveyServiceError::Storage` on repository failures.
    pub async fn submit_post_survey(
        &self,
        user_id: UserId,
        answers: Vec<SurveyAnswer>,
    ) -> Result<(), SurveyServiceError> {
        let response = SurveyResponse::new(user_id, SurveyKind::Post, self.clock.now(), answers)?;
        self.surveys.append_response(&response).await?;

        let mut profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .unwrap_or_default();
        profile.post_survey_completed = true;
        self.profiles.upsert_profile(user_id, &profile).await?;
        Ok(())
    }

    /// The user's most recent response of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `SurveyServiceError::Storage` on repository failures.
    pub async fn latest_response(
        &self,
        user_id: UserId,
        kind: SurveyKind,
    ) -> Result<Option<SurveyResponse>, SurveyServiceError> {
        Ok(self.surveys.latest_response(user_id, kind).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use coach_core::model::SurveyError;
    use coach_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> SurveyService {
        SurveyService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn post_survey_sets_milestone_flag() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let user = UserId::generate();

        svc.submit_post_survey(user, vec![SurveyAnswer::new("confidence", "4")])
            .await
            .unwrap();

        let profile = repo.get_profile(user).await.unwrap().expect("profile");
        assert!(profile.post_survey_completed);

        let latest = svc
            .latest_response(user, SurveyKind::Post)
            .await
            .unwrap()
            .expect("response");
        assert_eq!(latest.answers().len(), 1);
    }

    #[tokio::test]
    async fn intake_leaves_flags_untouched() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let user = UserId::generate();

        svc.submit_intake(user, vec![SurveyAnswer::new("background", "vocational school")])
            .await
            .unwrap();

        assert!(repo.get_profile(user).await.unwrap().is_none());
        assert!(svc
            .latest_response(user, SurveyKind::Intake)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let err = svc
            .submit_post_survey(UserId::generate(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SurveyServiceError::Survey(SurveyError::EmptyAnswers)
        ));
    }
}
