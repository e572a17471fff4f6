use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::repo_types::{IdentityRecord, NewIdentity},
    data::DataError,
    profiles::repo_types::Profile,
};

/// Identity records behind the session provider.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find an identity by its (already lower-cased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DataError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<IdentityRecord>, DataError>;

    /// Create the identity and its profile atomically. A taken email yields
    /// [`DataError::Constraint`] and creates nothing.
    async fn create_with_profile(
        &self,
        new: NewIdentity,
    ) -> Result<(IdentityRecord, Profile), DataError>;
}
