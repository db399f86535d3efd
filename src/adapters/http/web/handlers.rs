//! HTTP handlers for the pages.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::ExposeSecret;

use crate::adapters::http::middleware::{OptionalSession, RequireSession};
use crate::adapters::http::AppState;
use crate::ports::CredentialVerifier;

use super::dto::LoginForm;
use super::views;

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET / - greeting page for a logged-in user
pub async fn index(RequireSession(session): RequireSession) -> Html<String> {
    Html(views::index_page(&session.user_id))
}

/// GET /login
pub async fn login_page() -> Html<String> {
    Html(views::login_page(None))
}

/// POST /login - check credentials, open a session, set the cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(user_id) = state
        .credentials
        .verify(form.username.trim(), form.password.expose_secret())
        .await
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Html(views::login_page(Some("Invalid username or password"))),
        )
            .into_response();
    };

    let token = state.sessions.create(user_id.clone()).await;
    tracing::info!(user_id = %user_id, "User logged in");

    let cookie = Cookie::build((state.cookie_name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), Redirect::to("/")).into_response()
}

/// GET /logout - close every connection of the user, then end the session
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    OptionalSession(session): OptionalSession,
) -> Response {
    if let Some(session) = session {
        let closed = state.registry.disconnect_user(&session.user_id).await;
        state.sessions.revoke(&session.token).await;
        tracing::info!(user_id = %session.user_id, connections = closed, "User logged out");
    }

    let removal = Cookie::build((state.cookie_name.to_string(), "")).path("/");
    (jar.remove(removal), Redirect::to("/login")).into_response()
}
