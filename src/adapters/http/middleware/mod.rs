//! HTTP middleware for axum.
//!
//! - `session` - cookie session middleware and extractors

pub mod session;

pub use session::{
    session_middleware, CurrentSession, OptionalSession, RequireSession, SessionLayerState,
    SessionRejection,
};
