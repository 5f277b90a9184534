use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use coach_core::model::{
    FinalReportStatus, Profile, SessionId, SessionRecord, SessionStatus, SurveyAnswer,
    SurveyKind, SurveyResponse, UserId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn user_id_from_text(raw: &str) -> Result<UserId, StorageError> {
    raw.parse::<UserId>().map_err(ser)
}

pub(crate) fn session_id_from_text(raw: &str) -> Result<SessionId, StorageError> {
    raw.parse::<SessionId>().map_err(ser)
}

pub(crate) fn parse_session_status(s: &str) -> Result<SessionStatus, StorageError> {
    match s {
        "processing" => Ok(SessionStatus::Processing),
        "completed" => Ok(SessionStatus::Completed),
        "failed" => Ok(SessionStatus::Failed),
        _ => Err(StorageError::Serialization(format!("invalid status: {s}"))),
    }
}

pub(crate) fn parse_survey_kind(s: &str) -> Result<SurveyKind, StorageError> {
    match s {
        "intake" => Ok(SurveyKind::Intake),
        "post" => Ok(SurveyKind::Post),
        _ => Err(StorageError::Serialization(format!("invalid kind: {s}"))),
    }
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<Profile, StorageError> {
    let final_report_status: String = row.try_get("final_report_status").map_err(ser)?;
    Ok(Profile {
        baseline_completed: row.try_get("baseline_completed").map_err(ser)?,
        masterclass_attended: row.try_get("masterclass_attended").map_err(ser)?,
        post_survey_completed: row.try_get("post_survey_completed").map_err(ser)?,
        // Unrecognized markers collapse to NotStarted, same as the wire.
        final_report_status: FinalReportStatus::parse(&final_report_status),
        launch_huddle_attended: row.try_get("launch_huddle_attended").map_err(ser)?,
        masterclass_datetime: row.try_get("masterclass_datetime").map_err(ser)?,
        masterclass_location: row.try_get("masterclass_location").map_err(ser)?,
        launch_huddle_datetime: row.try_get("launch_huddle_datetime").map_err(ser)?,
        launch_huddle_location: row.try_get("launch_huddle_location").map_err(ser)?,
    })
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<SessionRecord, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let status: String = row.try_get("status").map_err(ser)?;

    SessionRecord::from_persisted(
        session_id_from_text(&id)?,
        user_id_from_text(&user_id)?,
        row.try_get("is_baseline").map_err(ser)?,
        parse_session_status(&status)?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
        row.try_get("audio_object").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_survey_row(row: &SqliteRow) -> Result<SurveyResponse, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let kind: String = row.try_get("kind").map_err(ser)?;
    let answers_json: String = row.try_get("answers").map_err(ser)?;
    let answers: Vec<SurveyAnswer> = serde_json::from_str(&answers_json).map_err(ser)?;

    SurveyResponse::new(
        user_id_from_text(&user_id)?,
        parse_survey_kind(&kind)?,
        row.try_get("submitted_at").map_err(ser)?,
        answers,
    )
    .map_err(ser)
}

pub(crate) fn answers_to_json(answers: &[SurveyAnswer]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}
