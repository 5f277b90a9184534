//! Seam over the hosted authentication provider.
//!
//! Account creation and password resets happen in the hosted auth API,
//! not in program storage; this trait keeps services testable without it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use coach_core::model::UserId;

use crate::error::AuthError;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Create an auth user for the given email and return its id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserExists` if the email is already registered,
    /// or `AuthError::Gateway` on provider failures.
    async fn create_user(&self, email: &str) -> Result<UserId, AuthError>;

    /// Trigger a password-reset email for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for unknown emails, or
    /// `AuthError::Gateway` on provider failures.
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;
}

/// In-memory stand-in for the hosted auth provider, for tests and
/// prototyping.
#[derive(Clone, Default)]
pub struct InMemoryAuthGateway {
    users: Arc<Mutex<HashMap<String, UserId>>>,
    resets: Arc<Mutex<Vec<String>>>,
}

impl InMemoryAuthGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a user, as if they had signed up through the app.
    pub fn register(&self, email: &str, user_id: UserId) {
        if let Ok(mut guard) = self.users.lock() {
            guard.insert(email.to_string(), user_id);
        }
    }

    /// Emails that received a reset, in request order.
    #[must_use]
    pub fn reset_requests(&self) -> Vec<String> {
        self.resets.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn create_user(&self, email: &str) -> Result<UserId, AuthError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| AuthError::Gateway(e.to_string()))?;
        if guard.contains_key(email) {
            return Err(AuthError::UserExists(email.to_string()));
        }
        let user_id = UserId::generate();
        guard.insert(email.to_string(), user_id);
        Ok(user_id)
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let known = self
            .users
            .lock()
            .map_err(|e| AuthError::Gateway(e.to_string()))?
            .contains_key(email);
        if !known {
            return Err(AuthError::UserNotFound(email.to_string()));
        }
        self.resets
            .lock()
            .map_err(|e| AuthError::Gateway(e.to_string()))?
            .push(email.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_reset_roundtrip() {
        let auth = InMemoryAuthGateway::new();
        let id = auth.create_user("coach@example.org").await.unwrap();
        assert_eq!(id.value().get_version_num(), 4);

        auth.reset_password("coach@example.org").await.unwrap();
        assert_eq!(auth.reset_requests(), vec!["coach@example.org".to_string()]);

        let err = auth.reset_password("nobody@example.org").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound(_)));

        let err = auth.create_user("coach@example.org").await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists(_)));
    }
}
