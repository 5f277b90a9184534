#![forbid(unsafe_code)]

pub mod admin_service;
pub mod analysis;
pub mod app_services;
pub mod auth;
pub mod error;
pub mod journey_service;
pub mod recording_service;
pub mod reports;
pub mod survey_service;

pub use coach_core::Clock;

pub use admin_service::AdminService;
pub use analysis::{AnalysisClient, AnalysisConfig, AnalysisGateway, InMemoryAnalysisGateway};
pub use app_services::AppServices;
pub use auth::{AuthGateway, InMemoryAuthGateway};
pub use error::{
    AdminError, AnalysisError, AppServicesError, AuthError, JourneyError, RecordingError,
    ReportError, SurveyServiceError,
};
pub use journey_service::JourneyService;
pub use recording_service::RecordingService;
pub use reports::{RawAnalysisResult, ReportService, SessionReport, map_analysis_result};
pub use survey_service::SurveyService;
