//! HTTP adapter for the browser-facing pages.

mod dto;
mod handlers;
mod routes;
mod views;

pub use dto::LoginForm;
pub use routes::app_router;
