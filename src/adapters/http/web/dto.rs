//! Form payloads accepted by the pages.

use secrecy::SecretString;
use serde::Deserialize;

/// `POST /login` form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
}
