//! Push Hub - per-user real-time event push over WebSocket.
//!
//! The core is the connection registry in [`application::connections`]:
//! it maps each user to their live connections, fans messages out through
//! bounded per-connection queues and tears connections down on logout,
//! session loss, transport failure or shutdown.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
