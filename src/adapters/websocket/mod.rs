//! WebSocket adapters for real-time push.
//!
//! # Architecture
//!
//! ```text
//!   browser ──GET /ws──► ws_handler ──connect──► ConnectionRegistry
//!      ▲                     │                          │
//!      │                read loop                 SenderLoop
//!      │                     │                          │
//!      └──── JSON frames ◄── WebSocketTransport ◄───────┘
//! ```
//!
//! # Components
//!
//! - [`handler`] - Axum WebSocket upgrade handler and read loop
//! - [`transport`] - `Transport` port over the socket's write half
//! - [`mock`] - Recording transport for tests

pub mod handler;
pub mod mock;
pub mod transport;

pub use handler::{ws_handler, WebSocketState};
pub use mock::MockTransport;
pub use transport::WebSocketTransport;
