//! Credential verification port used by the login form.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

/// Checks a username/password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the authenticated user, or `None` for unknown users and wrong
    /// passwords alike.
    async fn verify(&self, username: &str, password: &str) -> Option<UserId>;
}
