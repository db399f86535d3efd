//! Adapters - Implementations of port interfaces and outer surfaces.
//!
//! - `auth` - credential verification for the login form
//! - `http` - pages, session middleware and the router
//! - `producers` - background event sources feeding the registry
//! - `session` - session store implementations
//! - `websocket` - WebSocket transport, upgrade handler and test double

pub mod auth;
pub mod http;
pub mod producers;
pub mod session;
pub mod websocket;

pub use auth::StaticCredentialVerifier;
pub use http::{app_router, AppState};
pub use producers::{ProducerError, ProducerSupervisor};
pub use session::InMemorySessionStore;
pub use websocket::{MockTransport, WebSocketTransport};
