//! Why a connection was torn down, and which close status the client sees.
//!
//! Forced closures (logout, session invalidation, unauthenticated upgrade)
//! use the WebSocket policy-violation status so clients can tell "you were
//! logged out" apart from "the network dropped".

use std::fmt;

/// WebSocket close status codes (RFC 6455 §7.4.1).
pub mod close_code {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// Endpoint going away (server shutdown).
    pub const GOING_AWAY: u16 = 1001;
    /// Policy violation (logout, invalid session).
    pub const POLICY_VIOLATION: u16 = 1008;
}

/// Reason attached to a connection teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// The peer closed the socket or the read side failed.
    PeerClosed,
    /// A write to the transport failed.
    TransportFailure,
    /// Server-initiated clean close.
    Normal,
    /// Process is shutting down.
    Shutdown,
    /// The user logged out; every connection of theirs is closed.
    LoggedOut,
    /// The session guard found the session gone or bound to someone else.
    SessionInvalid,
    /// The upgrade request carried no valid session.
    Unauthenticated,
}

impl CloseReason {
    /// Close status to send, or `None` when the transport is already gone.
    pub fn close_code(&self) -> Option<u16> {
        match self {
            CloseReason::PeerClosed | CloseReason::TransportFailure => None,
            CloseReason::Normal => Some(close_code::NORMAL),
            CloseReason::Shutdown => Some(close_code::GOING_AWAY),
            CloseReason::LoggedOut | CloseReason::SessionInvalid | CloseReason::Unauthenticated => {
                Some(close_code::POLICY_VIOLATION)
            }
        }
    }

    /// True for the forced closures that require re-authentication.
    pub fn is_policy_violation(&self) -> bool {
        self.close_code() == Some(close_code::POLICY_VIOLATION)
    }

    /// Short human-readable text placed in the close frame.
    pub fn description(&self) -> &'static str {
        match self {
            CloseReason::PeerClosed => "peer closed",
            CloseReason::TransportFailure => "transport failure",
            CloseReason::Normal => "closed",
            CloseReason::Shutdown => "server shutting down",
            CloseReason::LoggedOut => "logged out",
            CloseReason::SessionInvalid => "session no longer valid",
            CloseReason::Unauthenticated => "not logged in",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_closures_use_policy_violation() {
        for reason in [
            CloseReason::LoggedOut,
            CloseReason::SessionInvalid,
            CloseReason::Unauthenticated,
        ] {
            assert_eq!(reason.close_code(), Some(1008));
            assert!(reason.is_policy_violation());
        }
    }

    #[test]
    fn clean_and_shutdown_closes_are_distinct_from_policy() {
        assert_eq!(CloseReason::Normal.close_code(), Some(1000));
        assert_eq!(CloseReason::Shutdown.close_code(), Some(1001));
        assert!(!CloseReason::Normal.is_policy_violation());
    }

    #[test]
    fn dead_transport_reasons_send_no_frame() {
        assert_eq!(CloseReason::PeerClosed.close_code(), None);
        assert_eq!(CloseReason::TransportFailure.close_code(), None);
    }
}
