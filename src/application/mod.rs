//! Application layer - orchestration between domain types and ports.

pub mod connections;

pub use connections::{
    BroadcastOutcome, ConnectionHandle, ConnectionRegistry, RegistryConfig, SessionBinding,
};
