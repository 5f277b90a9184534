use std::sync::Arc;

use coach_core::Clock;
use coach_core::model::{MilestonePatch, Profile, UserId};
use storage::repository::{AdminRoleRepository, ProfileRepository, ProfileRow};

use crate::auth::AuthGateway;
use crate::error::AdminError;

/// Privileged staff operations.
///
/// Every method except bootstrap checks the caller's admin role first and
/// refuses with `Forbidden` otherwise; row-level policies in the hosted
/// backend enforce the same boundary for unprivileged clients.
#[derive(Clone)]
pub struct AdminService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    admin_roles: Arc<dyn AdminRoleRepository>,
    auth: Arc<dyn AuthGateway>,
}

impl AdminService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        admin_roles: Arc<dyn AdminRoleRepository>,
        auth: Arc<dyn AuthGateway>,
    ) -> Self {
        Self {
            clock,
            profiles,
            admin_roles,
            auth,
        }
    }

    /// Bootstrap the very first administrator account.
    ///
    /// Deliberately unauthenticated, but only usable while the role table
    /// is empty; once any admin exists the endpoint is dead.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::AdminExists` if an admin already exists,
    /// `AdminError::Auth` if the auth user cannot be created, or
    /// `AdminError::Storage` on repository failures.
    pub async fn create_first_admin(&self, email: &str) -> Result<UserId, AdminError> {
        if self.admin_roles.count_admins().await? > 0 {
            return Err(AdminError::AdminExists);
        }

        let user_id = self.auth.create_user(email).await?;
        self.admin_roles
            .grant_admin(user_id, self.clock.now())
            .await?;
        self.profiles
            .upsert_profile(user_id, &Profile::default())
            .await?;
        Ok(user_id)
    }

    /// List participant profiles for the admin panel.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admin callers, or
    /// `AdminError::Storage` on repository failures.
    pub async fn list_users(
        &self,
        actor: UserId,
        limit: u32,
    ) -> Result<Vec<ProfileRow>, AdminError> {
        self.ensure_admin(actor).await?;
        Ok(self.profiles.list_profiles(limit).await?)
    }

    /// Edit a participant's milestone flags.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admin callers, or
    /// `AdminError::Storage` (NotFound) if the participant has no profile.
    pub async fn update_milestones(
        &self,
        actor: UserId,
        user_id: UserId,
        patch: &MilestonePatch,
    ) -> Result<Profile, AdminError> {
        self.ensure_admin(actor).await?;
        Ok(self.profiles.apply_milestone_patch(user_id, patch).await?)
    }

    /// Trigger a password reset for a participant.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admin callers, or
    /// `AdminError::Auth` if the provider rejects the request.
    pub async fn reset_password(&self, actor: UserId, email: &str) -> Result<(), AdminError> {
        self.ensure_admin(actor).await?;
        self.auth.reset_password(email).await?;
        Ok(())
    }

    async fn ensure_admin(&self, actor: UserId) -> Result<(), AdminError> {
        if self.admin_roles.is_admin(actor).await? {
            Ok(())
        } else {
            Err(AdminError::Forbidden)
        }
    }
}
