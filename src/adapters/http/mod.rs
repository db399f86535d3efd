//! HTTP adapters - login pages, health check and the WebSocket route.

pub mod middleware;
mod state;
pub mod web;

pub use state::AppState;
pub use web::app_router;
