//! Journey milestone evaluation.
//!
//! The coaching program is a fixed six-step chain: baseline recording,
//! masterclass, the session quota, the post-survey, the final report, and
//! the launch huddle. Everything the UI gates on (the progress bar, which
//! screens are reachable) derives from the projection computed here.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{FinalReportStatus, Profile};

/// Non-baseline completed sessions required before the post-survey unlocks.
pub const REQUIRED_SESSIONS: u32 = 3;

/// The six fixed checkpoints of the program, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Milestone {
    Baseline,
    Masterclass,
    Sessions,
    PostSurvey,
    FinalReport,
    LaunchHuddle,
}

impl Milestone {
    /// All milestones in chain order.
    pub const CHAIN: [Milestone; 6] = [
        Milestone::Baseline,
        Milestone::Masterclass,
        Milestone::Sessions,
        Milestone::PostSurvey,
        Milestone::FinalReport,
        Milestone::LaunchHuddle,
    ];
}

/// Display state of a single milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    Complete,
    Current,
    Locked,
}

impl MilestoneStatus {
    fn derive(complete: bool, locked: bool) -> Self {
        if complete {
            MilestoneStatus::Complete
        } else if locked {
            MilestoneStatus::Locked
        } else {
            MilestoneStatus::Current
        }
    }
}

/// Computed journey state driving the progress bar and navigation gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyProgress {
    pub baseline: MilestoneStatus,
    pub masterclass: MilestoneStatus,
    pub sessions: MilestoneStatus,
    pub post_survey: MilestoneStatus,
    pub final_report: MilestoneStatus,
    pub launch_huddle: MilestoneStatus,

    /// Completed non-baseline sessions, as supplied by the query layer.
    pub session_count: u32,
    pub final_report_status: FinalReportStatus,

    /// Formatted event metadata, `None` when unscheduled or unparseable.
    pub masterclass_date: Option<String>,
    pub masterclass_location: Option<String>,
    pub launch_huddle_date: Option<String>,
    pub launch_huddle_location: Option<String>,
}

impl JourneyProgress {
    /// Status of one milestone.
    #[must_use]
    pub fn status(&self, milestone: Milestone) -> MilestoneStatus {
        match milestone {
            Milestone::Baseline => self.baseline,
            Milestone::Masterclass => self.masterclass,
            Milestone::Sessions => self.sessions,
            Milestone::PostSurvey => self.post_survey,
            Milestone::FinalReport => self.final_report,
            Milestone::LaunchHuddle => self.launch_huddle,
        }
    }

    /// The milestone rendered as active, if any step remains.
    #[must_use]
    pub fn current(&self) -> Option<Milestone> {
        Milestone::CHAIN
            .into_iter()
            .find(|m| self.status(*m) == MilestoneStatus::Current)
    }

    /// Whether the UI affordances behind a milestone are reachable.
    #[must_use]
    pub fn is_unlocked(&self, milestone: Milestone) -> bool {
        self.status(milestone) != MilestoneStatus::Locked
    }
}

/// Projects profile flags and the completed-session count onto the
/// milestone chain.
///
/// Pure and total: any input combination produces a defined output, and
/// re-evaluating the same snapshot yields the same result. A missing
/// profile (not yet loaded, or not yet created) produces the
/// fresh-participant default: baseline current, everything else locked.
///
/// Each milestone's locked predicate reads only the completion flag of
/// the milestone immediately before it, not that milestone's computed
/// status. The chain invariant (prefix complete, at most one current,
/// suffix locked) therefore holds only as long as upstream writers keep
/// the flags monotonically consistent, which they do in practice; see the
/// `out_of_order_flags_*` test for what an inconsistent row yields.
#[must_use]
pub fn evaluate(profile: Option<&Profile>, session_count: u32) -> JourneyProgress {
    let Some(profile) = profile else {
        return JourneyProgress {
            baseline: MilestoneStatus::Current,
            masterclass: MilestoneStatus::Locked,
            sessions: MilestoneStatus::Locked,
            post_survey: MilestoneStatus::Locked,
            final_report: MilestoneStatus::Locked,
            launch_huddle: MilestoneStatus::Locked,
            session_count: 0,
            final_report_status: FinalReportStatus::NotStarted,
            masterclass_date: None,
            masterclass_location: None,
            launch_huddle_date: None,
            launch_huddle_location: None,
        };
    };

    let report_generated = profile.final_report_status == FinalReportStatus::Generated;

    JourneyProgress {
        // The entry point: never locked.
        baseline: MilestoneStatus::derive(profile.baseline_completed, false),
        masterclass: MilestoneStatus::derive(
            profile.masterclass_attended,
            !profile.baseline_completed,
        ),
        sessions: MilestoneStatus::derive(
            session_count >= REQUIRED_SESSIONS,
            !profile.masterclass_attended,
        ),
        post_survey: MilestoneStatus::derive(
            profile.post_survey_completed,
            session_count < REQUIRED_SESSIONS,
        ),
        final_report: MilestoneStatus::derive(report_generated, !profile.post_survey_completed),
        launch_huddle: MilestoneStatus::derive(profile.launch_huddle_attended, !report_generated),
        session_count,
        final_report_status: profile.final_report_status,
        masterclass_date: format_event_datetime(profile.masterclass_datetime.as_deref()),
        masterclass_location: profile.masterclass_location.clone(),
        launch_huddle_date: format_event_datetime(profile.launch_huddle_datetime.as_deref()),
        launch_huddle_location: profile.launch_huddle_location.clone(),
    }
}

/// Renders a stored event timestamp as `"Month D, YYYY, h:mm AM/PM"`.
///
/// Returns `None` for absent or malformed input; an unscheduled event is
/// not an error, and a badly stored one degrades to "no date" rather than
/// failing the whole projection.
#[must_use]
pub fn format_event_datetime(raw: Option<&str>) -> Option<String> {
    let parsed = parse_event_datetime(raw?)?;
    Some(parsed.format("%B %-d, %Y, %-I:%M %p").to_string())
}

/// Accepts RFC 3339 (keeping the wall-clock time as written) and the two
/// naive ISO shapes the backend has been observed to store.
fn parse_event_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    None
}
