use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SurveyError {
    #[error("survey response has no answers")]
    EmptyAnswers,
}

/// Which questionnaire a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyKind {
    /// Filled in at enrollment, before the baseline recording.
    Intake,
    /// Unlocked after the session quota is met; gates the final report.
    Post,
}

impl SurveyKind {
    /// Returns the persisted wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SurveyKind::Intake => "intake",
            SurveyKind::Post => "post",
        }
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    pub question: String,
    pub value: String,
}

impl SurveyAnswer {
    #[must_use]
    pub fn new(question: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            value: value.into(),
        }
    }
}

/// A submitted questionnaire.
///
/// Responses append; a participant re-submitting keeps the earlier rows,
/// and readers take the latest by submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyResponse {
    user_id: UserId,
    kind: SurveyKind,
    submitted_at: DateTime<Utc>,
    answers: Vec<SurveyAnswer>,
}

impl SurveyResponse {
    /// Builds a response, rejecting an empty answer list.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::EmptyAnswers` if `answers` is empty.
    pub fn new(
        user_id: UserId,
        kind: SurveyKind,
        submitted_at: DateTime<Utc>,
        answers: Vec<SurveyAnswer>,
    ) -> Result<Self, SurveyError> {
        if answers.is_empty() {
            return Err(SurveyError::EmptyAnswers);
        }
        Ok(Self {
            user_id,
            kind,
            submitted_at,
            answers,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn kind(&self) -> SurveyKind {
        self.kind
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn answers(&self) -> &[SurveyAnswer] {
        &self.answers
    }
}
