use std::sync::Arc;

use coach_core::model::{MilestonePatch, Profile, UserId};
use coach_core::time::fixed_clock;
use services::{AdminError, AdminService, InMemoryAuthGateway};
use storage::repository::{InMemoryRepository, ProfileRepository};

fn admin_service(repo: &InMemoryRepository, auth: &InMemoryAuthGateway) -> AdminService {
    AdminService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(auth.clone()),
    )
}

#[tokio::test]
async fn bootstrap_then_manage_participants() {
    let repo = InMemoryRepository::new();
    let auth = InMemoryAuthGateway::new();
    let svc = admin_service(&repo, &auth);

    // First-admin bootstrap works exactly once.
    let admin = svc.create_first_admin("staff@futureped.example").await.unwrap();
    let err = svc
        .create_first_admin("other@futureped.example")
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::AdminExists));

    // Participants show up in the listing once registered.
    let learner = UserId::generate();
    auth.register("learner@futureped.example", learner);
    repo.upsert_profile(learner, &Profile::default())
        .await
        .unwrap();

    let listed = svc.list_users(admin, 50).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|row| row.user_id == learner));

    // Staff fix up a missed check-in.
    let patch = MilestonePatch {
        baseline_completed: Some(true),
        masterclass_attended: Some(true),
        ..MilestonePatch::default()
    };
    let updated = svc.update_milestones(admin, learner, &patch).await.unwrap();
    assert!(updated.baseline_completed && updated.masterclass_attended);

    // And send the learner a password reset.
    svc.reset_password(admin, "learner@futureped.example")
        .await
        .unwrap();
    assert_eq!(
        auth.reset_requests(),
        vec!["learner@futureped.example".to_string()]
    );
}

#[tokio::test]
async fn every_gated_operation_refuses_outsiders() {
    let repo = InMemoryRepository::new();
    let auth = InMemoryAuthGateway::new();
    let svc = admin_service(&repo, &auth);

    svc.create_first_admin("staff@futureped.example").await.unwrap();

    let outsider = UserId::generate();
    auth.register("outsider@futureped.example", outsider);

    assert!(matches!(
        svc.list_users(outsider, 10).await.unwrap_err(),
        AdminError::Forbidden
    ));
    assert!(matches!(
        svc.update_milestones(outsider, outsider, &MilestonePatch::new())
            .await
            .unwrap_err(),
        AdminError::Forbidden
    ));
    assert!(matches!(
        svc.reset_password(outsider, "outsider@futureped.example")
            .await
            .unwrap_err(),
        AdminError::Forbidden
    ));
}
