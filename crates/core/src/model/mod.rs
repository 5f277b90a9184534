mod ids;
mod profile;
mod session;
mod survey;

pub use ids::{ParseIdError, SessionId, UserId};
pub use profile::{FinalReportStatus, MilestonePatch, Profile};
pub use session::{SessionRecord, SessionRecordError, SessionStatus};
pub use survey::{SurveyAnswer, SurveyError, SurveyKind, SurveyResponse};
