//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the connection core and the outside world. Adapters implement these ports.
//!
//! - `Transport` - Outbound half of one client channel (WebSocket in production)
//! - `SessionStore` - Authoritative session → identity lookup for revalidation
//! - `CredentialVerifier` - Login credential check

mod credential_verifier;
mod session_store;
mod transport;

pub use credential_verifier::CredentialVerifier;
pub use session_store::SessionStore;
pub use transport::Transport;
