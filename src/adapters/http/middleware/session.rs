//! Cookie session middleware and extractors.
//!
//! ```text
//! Request → session_middleware → resolves cookie → injects CurrentSession
//!                                        ↓
//!                Handler → RequireSession / OptionalSession read extensions
//! ```
//!
//! The middleware goes through the `SessionStore` port, so the same lookup
//! backs page requests, the WebSocket upgrade and the session guard.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::domain::foundation::{SessionToken, UserId};
use crate::ports::SessionStore;

/// State for [`session_middleware`].
#[derive(Clone)]
pub struct SessionLayerState {
    pub sessions: Arc<dyn SessionStore>,
    pub cookie_name: Arc<str>,
}

/// Session resolved from the request cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSession {
    pub token: SessionToken,
    pub user_id: UserId,
}

/// Resolves the session cookie and injects [`CurrentSession`].
///
/// Missing, malformed, revoked or unknown cookies all leave the request
/// anonymous; handlers decide what anonymity means for them.
pub async fn session_middleware(
    State(state): State<SessionLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let token = jar
        .get(&state.cookie_name)
        .and_then(|cookie| cookie.value().parse::<SessionToken>().ok());

    if let Some(token) = token {
        match state.sessions.current_identity(&token).await {
            Some(user_id) => {
                request
                    .extensions_mut()
                    .insert(CurrentSession { token, user_id });
            }
            None => tracing::debug!("Request carried an unknown session cookie"),
        }
    }

    next.run(request).await
}

/// Extractor that requires a logged-in session.
///
/// Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct RequireSession(pub CurrentSession);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .map(RequireSession)
            .ok_or(SessionRejection::LoginRequired)
    }
}

/// Extractor for routes that work with or without a session.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<CurrentSession>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(parts.extensions.get::<CurrentSession>().cloned()))
    }
}

/// Rejection for [`RequireSession`].
#[derive(Debug, Clone)]
pub enum SessionRejection {
    LoginRequired,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            SessionRejection::LoginRequired => Redirect::to("/login").into_response(),
        }
    }
}
