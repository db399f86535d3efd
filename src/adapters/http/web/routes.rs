//! Router for the whole HTTP surface.

use axum::{extract::FromRef, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::adapters::http::middleware::{session_middleware, SessionLayerState};
use crate::adapters::http::AppState;
use crate::adapters::websocket::ws_handler;

use super::handlers::{health, index, login, login_page, logout};

/// Creates the application router with all endpoints.
pub fn app_router(state: AppState) -> Router {
    let session_layer = SessionLayerState::from_ref(&state);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/ws", get(ws_handler))
        .layer(middleware::from_fn_with_state(session_layer, session_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
