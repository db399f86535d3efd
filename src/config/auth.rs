//! Login configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Demo users and session cookie settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Comma-separated `name:password` list
    #[serde(default = "default_users")]
    pub users: SecretString,

    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl AuthConfig {
    /// Validate login configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let users = self.users.expose_secret();
        if users.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PUSH_HUB__AUTH__USERS"));
        }
        let malformed = users
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .any(|entry| match entry.split_once(':') {
                Some((name, password)) => name.trim().is_empty() || password.is_empty(),
                None => true,
            });
        if malformed {
            return Err(ValidationError::InvalidUserEntry);
        }

        let cookie_ok = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !cookie_ok {
            return Err(ValidationError::InvalidCookieName);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_users() -> SecretString {
    SecretString::new(String::new())
}

fn default_cookie_name() -> String {
    "push_hub_session".to_string()
}
