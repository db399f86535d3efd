//! Authentication adapters.
//!
//! Implementations of the `CredentialVerifier` port:
//!
//! - `static_credentials` - fixed user list loaded from configuration

mod static_credentials;

pub use static_credentials::StaticCredentialVerifier;
