use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identity record behind a session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdentityRecord {
    pub id: Uuid,                        // unique user ID
    pub email: String,                   // lower-cased, unique
    #[serde(skip_serializing)]
    pub password_hash: String,           // Argon2 hash, not exposed in JSON
    pub user_metadata: sqlx::types::Json<serde_json::Map<String, serde_json::Value>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,      // creation timestamp
}

/// Everything needed to create an identity and its profile.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password_hash: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
