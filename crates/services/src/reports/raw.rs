use serde::Deserialize;

/// Raw analysis payload as produced by the external speech pipeline.
///
/// The pipeline is a separate service; only its output shape is modeled
/// here. Sections it has not produced (or that an older pipeline version
/// never emitted) deserialize to empty collections rather than failing
/// the whole report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysisResult {
    /// Per-speaker talk-time segments ("es" = engagement statistics).
    #[serde(default)]
    pub es_data: Vec<SpeakerSegment>,
    /// Scenario and dialogue grading ("gd" = guided dialogue).
    #[serde(default)]
    pub gd_data: Vec<ScenarioScore>,
    /// Trainer checklist, parsed out of the model's free-text judgment.
    #[serde(default)]
    pub trainer_check_parsed: Vec<TrainerCheck>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Aggregated talk time for one diarized speaker.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerSegment {
    pub speaker: String,
    #[serde(default)]
    pub seconds: f64,
    #[serde(default)]
    pub turns: u32,
}

/// One scored scenario or dialogue prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioScore {
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub max_score: f64,
}

/// One trainer-checklist criterion.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainerCheck {
    pub criterion: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub note: Option<String>,
}
