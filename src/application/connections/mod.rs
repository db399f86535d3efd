//! Connection management - per-user registry of live push connections.
//!
//! The registry owns every connection's outbound queue and background
//! tasks. Producers call the broadcast operations; the WebSocket adapter
//! calls `connect` and `close`; the logout flow calls `disconnect_user`.

mod connection;
mod registry;
mod sender;
mod session_guard;

pub use connection::{ConnectionHandle, SessionBinding};
pub use registry::{BroadcastOutcome, ConnectionRegistry, RegistryConfig};
