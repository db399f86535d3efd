//! Config-driven credential verifier.
//!
//! Users come from a `name:password` list such as
//! `alice:wonderland,bob:builder`. Passwords are held as secrets and compared
//! in constant time.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::domain::foundation::{UserId, ValidationError};
use crate::ports::CredentialVerifier;

/// Compared against when the username is unknown, so both paths do the
/// same amount of work.
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-never-matches";

/// Verifier backed by a fixed in-memory user list.
pub struct StaticCredentialVerifier {
    users: HashMap<String, (UserId, SecretString)>,
}

impl StaticCredentialVerifier {
    /// Creates a verifier with no users; every login fails.
    pub fn empty() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Adds one user.
    pub fn with_user(mut self, user_id: UserId, password: impl Into<String>) -> Self {
        self.users.insert(
            user_id.as_str().to_string(),
            (user_id, SecretString::new(password.into())),
        );
        self
    }

    /// Parses a comma-separated `name:password` list.
    ///
    /// Blank entries are skipped. The password is everything after the
    /// first `:`, so passwords may themselves contain colons.
    ///
    /// # Errors
    ///
    /// `ValidationError` when an entry has no `:`, an empty name or an
    /// empty password.
    pub fn parse(list: &str) -> Result<Self, ValidationError> {
        let mut verifier = Self::empty();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, password) = entry
                .split_once(':')
                .ok_or_else(|| ValidationError::invalid_format("auth.users", "expected name:password"))?;
            let user_id = UserId::new(name.trim())?;
            if password.is_empty() {
                return Err(ValidationError::empty_field("auth.users.password"));
            }
            verifier = verifier.with_user(user_id, password);
        }
        Ok(verifier)
    }

    /// Number of configured users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl std::fmt::Debug for StaticCredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialVerifier")
            .field("users", &self.users.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> Option<UserId> {
        let (user_id, expected) = match self.users.get(username) {
            Some((user_id, secret)) => (Some(user_id), secret.expose_secret().as_str()),
            None => (None, PLACEHOLDER_PASSWORD),
        };

        let matches: bool = expected.as_bytes().ct_eq(password.as_bytes()).into();
        match user_id {
            Some(user_id) if matches => Some(user_id.clone()),
            _ => {
                tracing::debug!(username, "Login rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_correct_password() {
        let verifier = StaticCredentialVerifier::parse("alice:wonderland,bob:builder").unwrap();

        assert_eq!(
            verifier.verify("alice", "wonderland").await,
            Some(UserId::new("alice").unwrap())
        );
        assert_eq!(
            verifier.verify("bob", "builder").await,
            Some(UserId::new("bob").unwrap())
        );
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_unknown_user() {
        let verifier = StaticCredentialVerifier::parse("alice:wonderland").unwrap();

        assert_eq!(verifier.verify("alice", "wonder").await, None);
        assert_eq!(verifier.verify("alice", "").await, None);
        assert_eq!(verifier.verify("mallory", "wonderland").await, None);
        assert_eq!(verifier.verify("mallory", PLACEHOLDER_PASSWORD).await, None);
    }

    #[tokio::test]
    async fn password_may_contain_colons() {
        let verifier = StaticCredentialVerifier::parse("alice:a:b:c").unwrap();
        assert!(verifier.verify("alice", "a:b:c").await.is_some());
    }

    #[test]
    fn parse_skips_blank_entries_and_trims() {
        let verifier = StaticCredentialVerifier::parse(" alice:x , ,bob:y,").unwrap();
        assert_eq!(verifier.user_count(), 2);
    }

    #[test]
    fn parse_rejects_malformed_entries() {
        assert!(StaticCredentialVerifier::parse("alice").is_err());
        assert!(StaticCredentialVerifier::parse(":secret").is_err());
        assert!(StaticCredentialVerifier::parse("alice:").is_err());
    }

    #[test]
    fn debug_does_not_leak_passwords() {
        let verifier = StaticCredentialVerifier::parse("alice:hunter2").unwrap();
        let debug = format!("{:?}", verifier);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn empty_verifier_rejects_everyone() {
        let verifier = StaticCredentialVerifier::empty();
        assert_eq!(verifier.verify("alice", "x").await, None);
    }
}
