use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profiles::repo_types::Profile;

/// Request body for sign-up. `username` and `full_name` end up in the
/// identity's metadata.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned after sign-up, sign-in or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the identity returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub profile: Option<Profile>,
}

/// Body of the auth entry point.
#[derive(Debug, Serialize)]
pub struct AuthEntry {
    pub sign_in: &'static str,
    pub sign_up: &'static str,
    pub refresh: &'static str,
}
