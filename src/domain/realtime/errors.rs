//! Errors raised by the connection registry and its transports.

use thiserror::Error;

use crate::domain::foundation::ConnectionId;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The same connection handle was registered twice.
    #[error("Connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}

/// Errors raised while writing to a connection's transport.
///
/// These never leave the connection boundary: the sender loop turns them
/// into a teardown of that single connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport was already closed.
    #[error("Transport closed")]
    Closed,

    /// The underlying write failed.
    #[error("Transport write failed: {0}")]
    Write(String),

    /// The message could not be encoded.
    #[error("Message serialization failed: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Creates a write error from any displayable cause.
    pub fn write(cause: impl std::fmt::Display) -> Self {
        Self::Write(cause.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_registered_mentions_connection() {
        let id = ConnectionId::new();
        let err = RegistryError::AlreadyRegistered(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn transport_write_wraps_cause() {
        let err = TransportError::write("broken pipe");
        assert_eq!(err.to_string(), "Transport write failed: broken pipe");
    }
}
