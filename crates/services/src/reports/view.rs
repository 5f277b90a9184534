use serde::Serialize;

use super::raw::RawAnalysisResult;

/// Presentation-agnostic analytics summary for one recorded session.
///
/// This is intentionally **not** a chart model: no colors, no axis
/// labels, no locale assumptions. The UI decides how to render shares
/// and scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub talk_time: Vec<SpeakerShare>,
    pub total_talk_seconds: f64,
    pub interaction: InteractionSummary,
    pub scenario_scores: Vec<ScenarioScoreView>,
    pub trainer_checks: Vec<TrainerCheckView>,
    pub checks_passed: u32,
    pub checks_total: u32,
    pub audio_url: Option<String>,
}

/// One speaker's slice of the talk-time distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerShare {
    pub speaker: String,
    pub seconds: f64,
    /// Share of total talk time, 0–100. Zero when nothing was spoken.
    pub share_pct: f64,
    pub turns: u32,
}

/// Speaker-interaction totals across the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionSummary {
    pub speakers: u32,
    pub total_turns: u32,
}

/// One scored scenario, normalized for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioScoreView {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    /// Score as a percentage of the maximum; `None` when the pipeline
    /// sent no usable maximum.
    pub percent: Option<f64>,
}

/// One trainer-checklist item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainerCheckView {
    pub criterion: String,
    pub passed: bool,
    pub note: Option<String>,
}

/// Reshapes the pipeline's raw payload into the session report view.
///
/// Pure data reshaping: an empty payload maps to an empty report, and no
/// section can fail the others.
#[must_use]
pub fn map_analysis_result(raw: &RawAnalysisResult) -> SessionReport {
    let total_talk_seconds: f64 = raw.es_data.iter().map(|s| s.seconds.max(0.0)).sum();

    let talk_time: Vec<SpeakerShare> = raw
        .es_data
        .iter()
        .map(|segment| {
            let seconds = segment.seconds.max(0.0);
            let share_pct = if total_talk_seconds > 0.0 {
                seconds / total_talk_seconds * 100.0
            } else {
                0.0
            };
            SpeakerShare {
                speaker: segment.speaker.clone(),
                seconds,
                share_pct,
                turns: segment.turns,
            }
        })
        .collect();

    let interaction = InteractionSummary {
        speakers: u32::try_from(talk_time.len()).unwrap_or(u32::MAX),
        total_turns: talk_time.iter().map(|s| s.turns).sum(),
    };

    let scenario_scores: Vec<ScenarioScoreView> = raw
        .gd_data
        .iter()
        .map(|scored| ScenarioScoreView {
            name: scored.name.clone(),
            score: scored.score,
            max_score: scored.max_score,
            percent: (scored.max_score > 0.0)
                .then(|| (scored.score / scored.max_score * 100.0).clamp(0.0, 100.0)),
        })
        .collect();

    let trainer_checks: Vec<TrainerCheckView> = raw
        .trainer_check_parsed
        .iter()
        .map(|check| TrainerCheckView {
            criterion: check.criterion.clone(),
            passed: check.passed,
            note: check.note.clone(),
        })
        .collect();

    let checks_passed = u32::try_from(trainer_checks.iter().filter(|c| c.passed).count())
        .unwrap_or(u32::MAX);
    let checks_total = u32::try_from(trainer_checks.len()).unwrap_or(u32::MAX);

    SessionReport {
        talk_time,
        total_talk_seconds,
        interaction,
        scenario_scores,
        trainer_checks,
        checks_passed,
        checks_total,
        audio_url: raw.audio_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::raw::{ScenarioScore, SpeakerSegment, TrainerCheck};

    #[test]
    fn empty_payload_maps_to_empty_report() {
        let report = map_analysis_result(&RawAnalysisResult::default());
        assert!(report.talk_time.is_empty());
        assert_eq!(report.total_talk_seconds, 0.0);
        assert_eq!(report.interaction, InteractionSummary::default());
        assert_eq!(report.checks_total, 0);
        assert!(report.audio_url.is_none());
    }

    #[test]
    fn talk_time_shares_sum_to_one_hundred() {
        let raw = RawAnalysisResult {
            es_data: vec![
                SpeakerSegment {
                    speaker: "Trainer".into(),
                    seconds: 300.0,
                    turns: 14,
                },
                SpeakerSegment {
                    speaker: "Participants".into(),
                    seconds: 100.0,
                    turns: 22,
                },
            ],
            ..RawAnalysisResult::default()
        };
        let report = map_analysis_result(&raw);

        assert_eq!(report.total_talk_seconds, 400.0);
        assert_eq!(report.talk_time[0].share_pct, 75.0);
        assert_eq!(report.talk_time[1].share_pct, 25.0);
        assert_eq!(report.interaction.speakers, 2);
        assert_eq!(report.interaction.total_turns, 36);
    }

    #[test]
    fn scenario_percent_requires_positive_maximum() {
        let raw = RawAnalysisResult {
            gd_data: vec![
                ScenarioScore {
                    name: "Open questioning".into(),
                    score: 4.0,
                    max_score: 5.0,
                },
                ScenarioScore {
                    name: "Unscored prompt".into(),
                    score: 2.0,
                    max_score: 0.0,
                },
            ],
            ..RawAnalysisResult::default()
        };
        let report = map_analysis_result(&raw);

        assert_eq!(report.scenario_scores[0].percent, Some(80.0));
        assert_eq!(report.scenario_scores[1].percent, None);
    }

    #[test]
    fn trainer_checks_are_tallied() {
        let raw = RawAnalysisResult {
            trainer_check_parsed: vec![
                TrainerCheck {
                    criterion: "Names the learning goal".into(),
                    passed: true,
                    note: None,
                },
                TrainerCheck {
                    criterion: "Closes with a transfer task".into(),
                    passed: false,
                    note: Some("ran out of time".into()),
                },
            ],
            ..RawAnalysisResult::default()
        };
        let report = map_analysis_result(&raw);

        assert_eq!(report.checks_passed, 1);
        assert_eq!(report.checks_total, 2);
        assert_eq!(
            report.trainer_checks[1].note.as_deref(),
            Some("ran out of time")
        );
    }

    #[test]
    fn negative_seconds_are_clamped() {
        let raw = RawAnalysisResult {
            es_data: vec![SpeakerSegment {
                speaker: "Trainer".into(),
                seconds: -5.0,
                turns: 1,
            }],
            ..RawAnalysisResult::default()
        };
        let report = map_analysis_result(&raw);
        assert_eq!(report.talk_time[0].seconds, 0.0);
        assert_eq!(report.talk_time[0].share_pct, 0.0);
    }
}
