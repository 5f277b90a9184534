use thiserror::Error;

use crate::model::{SessionRecordError, SurveyError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Survey(#[from] SurveyError),
}
