use std::sync::Arc;

use coach_core::journey::{Milestone, MilestoneStatus};
use coach_core::model::{MilestonePatch, Profile, SurveyAnswer, UserId};
use coach_core::time::fixed_clock;
use services::{AppServices, InMemoryAnalysisGateway, InMemoryAuthGateway, JourneyService};
use storage::repository::{InMemoryRepository, ProfileRepository};

/// Walks one participant through the whole program and checks the
/// journey projection after every step.
#[tokio::test]
async fn full_program_walk_unlocks_milestones_in_order() {
    let auth = InMemoryAuthGateway::new();
    let analysis = InMemoryAnalysisGateway::new();
    let app = AppServices::in_memory(
        fixed_clock(),
        Arc::new(auth.clone()),
        Arc::new(analysis.clone()),
    );

    let admin = app
        .admin()
        .create_first_admin("staff@futureped.example")
        .await
        .unwrap();

    let learner = UserId::generate();
    auth.register("learner@futureped.example", learner);

    // No profile row yet; nothing is unlocked past baseline.
    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.current(), Some(Milestone::Baseline));
    assert!(!progress.is_unlocked(Milestone::Sessions));

    // Baseline recording (also creates the profile row).
    let baseline = app.recording().start_session(learner, true).await.unwrap();
    app.recording()
        .complete_session(learner, baseline.id(), Some("recordings/base.webm".into()))
        .await
        .unwrap();

    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.baseline, MilestoneStatus::Complete);
    assert_eq!(progress.current(), Some(Milestone::Masterclass));
    assert_eq!(progress.session_count, 0);

    // Staff check the learner in at the masterclass.
    let patch = MilestonePatch {
        masterclass_attended: Some(true),
        ..MilestonePatch::default()
    };
    app.admin()
        .update_milestones(admin, learner, &patch)
        .await
        .unwrap();

    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.current(), Some(Milestone::Sessions));

    // Two sessions are not enough.
    for _ in 0..2 {
        let session = app.recording().start_session(learner, false).await.unwrap();
        app.recording()
            .complete_session(learner, session.id(), None)
            .await
            .unwrap();
    }
    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.session_count, 2);
    assert_eq!(progress.sessions, MilestoneStatus::Current);
    assert!(!progress.is_unlocked(Milestone::PostSurvey));

    // The third completed session unlocks the post-survey.
    let session = app.recording().start_session(learner, false).await.unwrap();
    app.recording()
        .complete_session(learner, session.id(), None)
        .await
        .unwrap();

    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.sessions, MilestoneStatus::Complete);
    assert_eq!(progress.current(), Some(Milestone::PostSurvey));

    // Post-survey, then the generated report, then the huddle.
    app.surveys()
        .submit_post_survey(learner, vec![SurveyAnswer::new("confidence", "4")])
        .await
        .unwrap();

    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.current(), Some(Milestone::FinalReport));

    app.reports().request_final_report(learner).await.unwrap();
    let progress = app.journey().progress_for(learner).await.unwrap();
    // Pending is not generated; the milestone stays current.
    assert_eq!(progress.final_report, MilestoneStatus::Current);
    assert!(!progress.is_unlocked(Milestone::LaunchHuddle));

    app.reports().mark_report_generated(learner).await.unwrap();
    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.final_report, MilestoneStatus::Complete);
    assert_eq!(progress.current(), Some(Milestone::LaunchHuddle));

    let patch = MilestonePatch {
        launch_huddle_attended: Some(true),
        ..MilestonePatch::default()
    };
    app.admin()
        .update_milestones(admin, learner, &patch)
        .await
        .unwrap();

    let progress = app.journey().progress_for(learner).await.unwrap();
    assert_eq!(progress.current(), None);
    for milestone in Milestone::CHAIN {
        assert_eq!(progress.status(milestone), MilestoneStatus::Complete);
    }
}

#[tokio::test]
async fn scheduling_metadata_flows_through_the_projection() {
    let repo = InMemoryRepository::new();
    let learner = UserId::generate();

    repo.upsert_profile(
        learner,
        &Profile {
            masterclass_datetime: Some("2025-03-08T18:30:00Z".into()),
            masterclass_location: Some("Campus West, Hall 2".into()),
            launch_huddle_datetime: Some("sometime in June".into()),
            ..Profile::default()
        },
    )
    .await
    .unwrap();

    let journey = JourneyService::new(Arc::new(repo.clone()), Arc::new(repo));
    let progress = journey.progress_for(learner).await.unwrap();

    assert_eq!(
        progress.masterclass_date.as_deref(),
        Some("March 8, 2025, 6:30 PM")
    );
    assert_eq!(
        progress.masterclass_location.as_deref(),
        Some("Campus West, Hall 2")
    );
    // Malformed schedule strings degrade to "no date" without failing.
    assert!(progress.launch_huddle_date.is_none());
}
