use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Session token payload. Both tokens of a pair carry the same `sid`, so
/// revoking the session invalidates them together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub sid: Uuid,
    /// Unix seconds.
    pub iat: usize,
    /// Unix seconds.
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}
