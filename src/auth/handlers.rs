use axum::{
    extract::{FromRef, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthEntry, AuthResponse, MeResponse, PublicUser, RefreshRequest, SignInRequest,
            SignUpRequest,
        },
        extractors::{AuthUser, AUTH_ENTRY},
        jwt::{JwtKeys, TokenPair},
        password::{hash_password, meets_policy, verify_password},
        repo_types::NewIdentity,
        services::{is_valid_email, normalize_email, signup_metadata},
    },
    data::DataError,
    error::{AppError, Result},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(AUTH_ENTRY, get(auth_entry))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/auth/sign-out", post(sign_out))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

pub async fn auth_entry() -> Json<AuthEntry> {
    Json(AuthEntry {
        sign_in: "/auth/sign-in",
        sign_up: "/auth/sign-up",
        refresh: "/auth/refresh",
    })
}

fn respond(state: &AppState, pair: TokenPair, user: PublicUser) -> Json<AuthResponse> {
    state.sessions.signed_in(user.id, pair.session_id);
    Json(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user,
    })
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::InvalidInput("Invalid email".into()));
    }

    if !meets_policy(&payload.password) {
        warn!("password too short");
        return Err(AppError::InvalidInput("Password too short".into()));
    }

    if state.identities.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let password_hash = hash_password(&payload.password)?;
    let metadata = signup_metadata(&payload);

    let (identity, profile) = match state
        .identities
        .create_with_profile(NewIdentity {
            email,
            password_hash,
            metadata,
        })
        .await
    {
        Ok(created) => created,
        // lost a race against a concurrent sign-up with the same email
        Err(DataError::Constraint(_)) => return Err(AppError::EmailTaken),
        Err(e) => {
            error!(error = %e, "create identity failed");
            return Err(e.into());
        }
    };

    let pair = JwtKeys::from_ref(&state).sign_pair(identity.id, &identity.email)?;

    info!(user_id = %identity.id, username = %profile.username, "user signed up");
    Ok(respond(
        &state,
        pair,
        PublicUser {
            id: identity.id,
            email: identity.email,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::InvalidInput("Invalid email".into()));
    }

    let Some(identity) = state.identities.find_by_email(&email).await? else {
        warn!(%email, "sign-in with unknown email");
        return Err(AppError::Unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &identity.password_hash)? {
        warn!(user_id = %identity.id, "sign-in with invalid password");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let pair = JwtKeys::from_ref(&state).sign_pair(identity.id, &identity.email)?;

    info!(user_id = %identity.id, "user signed in");
    Ok(respond(
        &state,
        pair,
        PublicUser {
            id: identity.id,
            email: identity.email,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token"))?;

    if !state.sessions.is_active(claims.sid).await {
        return Err(AppError::Unauthorized("Session has been signed out"));
    }

    let identity = state
        .identities
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized("User not found"))?;

    let pair = keys.sign_pair_for_session(identity.id, &identity.email, claims.sid)?;
    Ok(Json(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: PublicUser {
            id: identity.id,
            email: identity.email,
        },
    }))
}

/// Ends the current session and sends the client back to the auth entry point.
#[instrument(skip(state))]
pub async fn sign_out(State(state): State<AppState>, AuthUser(identity): AuthUser) -> Redirect {
    let keys = JwtKeys::from_ref(&state);
    let refresh_expires_at =
        (OffsetDateTime::now_utc().unix_timestamp() as u64 + keys.refresh_ttl.as_secs()) as usize;
    state.sessions.sign_out(&identity, refresh_expires_at).await;
    Redirect::to(AUTH_ENTRY)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<MeResponse>> {
    let profile = state.data.profile_by_user(identity.id).await?;
    Ok(Json(MeResponse {
        id: identity.id,
        email: identity.email,
        profile,
    }))
}
