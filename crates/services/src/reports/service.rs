use std::sync::Arc;

use coach_core::model::{FinalReportStatus, MilestonePatch, SessionId, UserId};
use storage::repository::ProfileRepository;

use crate::analysis::AnalysisGateway;
use crate::error::ReportError;
use super::view::{SessionReport, map_analysis_result};

/// Report access and final-report lifecycle.
///
/// The speech pipeline and the report generator are external; this service
/// only reshapes what they produce and tracks the profile's
/// `final_report_status` marker.
#[derive(Clone)]
pub struct ReportService {
    analysis: Arc<dyn AnalysisGateway>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ReportService {
    #[must_use]
    pub fn new(analysis: Arc<dyn AnalysisGateway>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { analysis, profiles }
    }

    /// Fetch and reshape the analysis result for a session.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ResultUnavailable` while the pipeline has not
    /// produced a payload, or `ReportError::Analysis` on gateway failures.
    pub async fn session_report(&self, session_id: SessionId) -> Result<SessionReport, ReportError> {
        let raw = self
            .analysis
            .fetch_result(session_id)
            .await?
            .ok_or(ReportError::ResultUnavailable(session_id))?;
        Ok(map_analysis_result(&raw))
    }

    /// Proxy a stored recording download.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Analysis` on gateway failures.
    pub async fn download_audio(&self, object: &str) -> Result<Vec<u8>, ReportError> {
        Ok(self.analysis.fetch_audio(object).await?)
    }

    /// Queue final-report generation for a user.
    ///
    /// Idempotent: a report already pending or generated stays as it is;
    /// only `NotStarted` transitions to `Pending`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Storage` if the user has no profile row.
    pub async fn request_final_report(&self, user_id: UserId) -> Result<FinalReportStatus, ReportError> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        if profile.final_report_status != FinalReportStatus::NotStarted {
            return Ok(profile.final_report_status);
        }

        let patch = MilestonePatch {
            final_report_status: Some(FinalReportStatus::Pending),
            ..MilestonePatch::default()
        };
        let updated = self.profiles.apply_milestone_patch(user_id, &patch).await?;
        Ok(updated.final_report_status)
    }

    /// Record that the external generator finished a user's report.
    ///
    /// Called from the generation pipeline's completion callback; this is
    /// the only writer that sets `Generated`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Storage` if the user has no profile row.
    pub async fn mark_report_generated(&self, user_id: UserId) -> Result<(), ReportError> {
        let patch = MilestonePatch {
            final_report_status: Some(FinalReportStatus::Generated),
            ..MilestonePatch::default()
        };
        self.profiles.apply_milestone_patch(user_id, &patch).await?;
        Ok(())
    }
}
