//! Shared error types for the services crate.

use thiserror::Error;

use coach_core::model::{SessionId, SessionRecordError, SurveyError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `JourneyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JourneyError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RecordingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordingError {
    #[error("session belongs to another user")]
    WrongUser,
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SurveyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurveyServiceError {
    #[error(transparent)]
    Survey(#[from] SurveyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the analysis gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("analysis service is not configured")]
    Disabled,
    #[error("analysis service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("analysis gateway failure: {0}")]
    Gateway(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ReportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("no analysis result available for session {0}")]
    ResultUnavailable(SessionId),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the auth gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("auth user not found: {0}")]
    UserNotFound(String),
    #[error("auth user already exists: {0}")]
    UserExists(String),
    #[error("auth request failed: {0}")]
    Gateway(String),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("caller is not an administrator")]
    Forbidden,
    #[error("an administrator already exists")]
    AdminExists,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
