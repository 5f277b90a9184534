use serde::{Deserialize, Serialize};
use std::fmt;

/// Final-report generation state as persisted on the profile.
///
/// The wire representation is a snake_case string; anything the backend
/// hands us that is not a recognized marker collapses to `NotStarted`, so
/// only the exact `generated` value can ever unlock the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinalReportStatus {
    #[default]
    NotStarted,
    Pending,
    Generated,
}

impl FinalReportStatus {
    /// Returns the persisted wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FinalReportStatus::NotStarted => "not_started",
            FinalReportStatus::Pending => "pending",
            FinalReportStatus::Generated => "generated",
        }
    }

    /// Parses a persisted wire string, falling back to `NotStarted`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => FinalReportStatus::Pending,
            "generated" => FinalReportStatus::Generated,
            _ => FinalReportStatus::NotStarted,
        }
    }
}

impl From<String> for FinalReportStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FinalReportStatus> for String {
    fn from(value: FinalReportStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FinalReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-participant program profile as persisted by the backend.
///
/// The journey evaluator reads this record; it is written by the baseline
/// recording flow, the survey submission flow, event check-ins, and staff
/// edits in the admin panel. A freshly registered participant starts with
/// the `Default` shape (nothing completed, nothing scheduled).
///
/// Event timestamps are kept as the raw strings the backend stores; they
/// are only interpreted at display time, where a malformed value simply
/// renders as "no date".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub baseline_completed: bool,
    #[serde(default)]
    pub masterclass_attended: bool,
    #[serde(default)]
    pub post_survey_completed: bool,
    #[serde(default)]
    pub final_report_status: FinalReportStatus,
    #[serde(default)]
    pub launch_huddle_attended: bool,
    #[serde(default)]
    pub masterclass_datetime: Option<String>,
    #[serde(default)]
    pub masterclass_location: Option<String>,
    #[serde(default)]
    pub launch_huddle_datetime: Option<String>,
    #[serde(default)]
    pub launch_huddle_location: Option<String>,
}

/// Partial edit of a profile, as submitted from the admin panel.
///
/// `None` fields leave the profile untouched; scheduling metadata can be
/// set but not cleared from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestonePatch {
    #[serde(default)]
    pub baseline_completed: Option<bool>,
    #[serde(default)]
    pub masterclass_attended: Option<bool>,
    #[serde(default)]
    pub post_survey_completed: Option<bool>,
    #[serde(default)]
    pub final_report_status: Option<FinalReportStatus>,
    #[serde(default)]
    pub launch_huddle_attended: Option<bool>,
    #[serde(default)]
    pub masterclass_datetime: Option<String>,
    #[serde(default)]
    pub masterclass_location: Option<String>,
    #[serde(default)]
    pub launch_huddle_datetime: Option<String>,
    #[serde(default)]
    pub launch_huddle_location: Option<String>,
}

impl MilestonePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the set fields onto the profile.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(v) = self.baseline_completed {
            profile.baseline_completed = v;
        }
        if let Some(v) = self.masterclass_attended {
            profile.masterclass_attended = v;
        }
        if let Some(v) = self.post_survey_completed {
            profile.post_survey_completed = v;
        }
        if let Some(v) = self.final_report_status {
            profile.final_report_status = v;
        }
        if let Some(v) = self.launch_huddle_attended {
            profile.launch_huddle_attended = v;
        }
        if let Some(v) = self.masterclass_datetime.clone() {
            profile.masterclass_datetime = Some(v);
        }
        if let Some(v) = self.masterclass_location.clone() {
            profile.masterclass_location = Some(v);
        }
        if let Some(v) = self.launch_huddle_datetime.clone() {
            profile.launch_huddle_datetime = Some(v);
        }
        if let Some(v) = self.launch_huddle_location.clone() {
            profile.launch_huddle_location = Some(v);
        }
    }
}
