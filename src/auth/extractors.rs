use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use tracing::warn;

use super::{jwt::JwtKeys, session::Identity};
use crate::{error::AppError, state::AppState};

/// Where unauthenticated page requests are sent.
pub const AUTH_ENTRY: &str = "/auth";

/// Auth gate for pages: no valid session redirects to the auth entry point.
pub struct Session(pub Identity);

/// Auth gate for API routes: no valid session is a 401.
pub struct AuthUser(pub Identity);

async fn resolve_identity(parts: &Parts, state: &AppState) -> Result<Identity, &'static str> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or("Missing Authorization header")?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or("Invalid Authorization header")?;

    let claims = JwtKeys::from_ref(state).verify_access(token).map_err(|_| {
        warn!("invalid or expired token");
        "Invalid or expired token"
    })?;

    if !state.sessions.is_active(claims.sid).await {
        warn!(user_id = %claims.sub, session_id = %claims.sid, "token of a signed-out session");
        return Err("Session has been signed out");
    }

    Ok(Identity::from(claims))
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state)
            .await
            .map(Session)
            .map_err(|_| Redirect::to(AUTH_ENTRY))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state)
            .await
            .map(AuthUser)
            .map_err(AppError::Unauthorized)
    }
}
