use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::admin_service::AdminService;
use crate::analysis::{AnalysisClient, AnalysisGateway};
use crate::auth::AuthGateway;
use crate::error::AppServicesError;
use crate::journey_service::JourneyService;
use crate::recording_service::RecordingService;
use crate::reports::ReportService;
use crate::survey_service::SurveyService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    journey: Arc<JourneyService>,
    recording: Arc<RecordingService>,
    surveys: Arc<SurveyService>,
    reports: Arc<ReportService>,
    admin: Arc<AdminService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// The analysis gateway is configured from the environment; the auth
    /// gateway is injected since the hosted provider differs per
    /// deployment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        auth: Arc<dyn AuthGateway>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let analysis: Arc<dyn AnalysisGateway> = Arc::new(AnalysisClient::from_env());
        Ok(Self::assemble(&storage, clock, auth, analysis))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn in_memory(
        clock: Clock,
        auth: Arc<dyn AuthGateway>,
        analysis: Arc<dyn AnalysisGateway>,
    ) -> Self {
        Self::assemble(&Storage::in_memory(), clock, auth, analysis)
    }

    fn assemble(
        storage: &Storage,
        clock: Clock,
        auth: Arc<dyn AuthGateway>,
        analysis: Arc<dyn AnalysisGateway>,
    ) -> Self {
        let journey = Arc::new(JourneyService::new(
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.sessions),
        ));
        let recording = Arc::new(RecordingService::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.sessions),
        ));
        let surveys = Arc::new(SurveyService::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.surveys),
        ));
        let reports = Arc::new(ReportService::new(
            analysis,
            Arc::clone(&storage.profiles),
        ));
        let admin = Arc::new(AdminService::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.admin_roles),
            auth,
        ));

        Self {
            journey,
            recording,
            surveys,
            reports,
            admin,
        }
    }

    #[must_use]
    pub fn journey(&self) -> Arc<JourneyService> {
        Arc::clone(&self.journey)
    }

    #[must_use]
    pub fn recording(&self) -> Arc<RecordingService> {
        Arc::clone(&self.recording)
    }

    #[must_use]
    pub fn surveys(&self) -> Arc<SurveyService> {
        Arc::clone(&self.surveys)
    }

    #[must_use]
    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.reports)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }
}
