mod raw;
mod service;
mod view;

// Public API of the report subsystem.
pub use crate::error::ReportError;
pub use raw::{RawAnalysisResult, ScenarioScore, SpeakerSegment, TrainerCheck};
pub use service::ReportService;
pub use view::{
    InteractionSummary, ScenarioScoreView, SessionReport, SpeakerShare, TrainerCheckView,
    map_analysis_result,
};
