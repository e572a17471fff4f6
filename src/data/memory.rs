//! In-process stand-in for the hosted store. It applies the same ownership
//! rules, foreign keys and cascades as the SQL migrations, and can be told to
//! fail every call.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DataClient, DataError, Order, RecipeQuery};
use crate::{
    auth::{
        repo::IdentityStore,
        repo_types::{IdentityRecord, NewIdentity},
    },
    profiles::{repo_types::Profile, services::default_username},
    recipes::repo_types::{NewRecipe, Recipe, RecipeWithAuthor},
};

#[derive(Default)]
struct Tables {
    identities: Vec<IdentityRecord>,
    profiles: Vec<Profile>,
    // (insertion sequence, row); the sequence breaks created_at ties
    recipes: Vec<(u64, Recipe)>,
}

#[derive(Default)]
pub struct MemoryClient {
    tables: RwLock<Tables>,
    seq: AtomicU64,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails as if the backend were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// Number of data-client calls issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn enter(&self) -> Result<(), DataError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(DataError::Unavailable("injected failure".into()));
        }
        Ok(())
    }

    /// Creates an identity `<username>@example.com` with its profile.
    pub async fn seed_profile(&self, username: &str) -> Result<Uuid, DataError> {
        let mut metadata = serde_json::Map::new();
        metadata.insert("username".into(), username.into());
        let (identity, _) = self
            .insert_identity(NewIdentity {
                email: format!("{username}@example.com"),
                password_hash: String::new(),
                metadata,
            })
            .await?;
        Ok(identity.id)
    }

    /// Inserts a minimal recipe for `owner`, bypassing the call counter.
    pub async fn seed_recipe(&self, owner: Uuid, name: &str) -> Result<Recipe, DataError> {
        self.insert_row(NewRecipe {
            user_id: owner,
            name: name.to_string(),
            image_url: None,
            ingredients: vec!["1 cup of something".into()],
            instructions: vec!["Cook it".into()],
            cooking_time: None,
            category: None,
        })
        .await
    }

    /// Removes a profile and, through the foreign key, all of its recipes.
    pub async fn delete_profile(&self, user_id: Uuid) -> bool {
        let mut t = self.tables.write().await;
        let before = t.profiles.len();
        t.profiles.retain(|p| p.user_id != user_id);
        t.recipes.retain(|(_, r)| r.user_id != user_id);
        t.profiles.len() != before
    }

    async fn insert_identity(
        &self,
        new: NewIdentity,
    ) -> Result<(IdentityRecord, Profile), DataError> {
        let mut t = self.tables.write().await;
        if t.identities.iter().any(|i| i.email == new.email) {
            return Err(DataError::Constraint("identities_email_key".into()));
        }

        let now = OffsetDateTime::now_utc();
        let identity = IdentityRecord {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            user_metadata: sqlx::types::Json(new.metadata),
            created_at: now,
        };
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: identity.id,
            username: default_username(&identity.email, &identity.user_metadata),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        t.identities.push(identity.clone());
        t.profiles.push(profile.clone());
        Ok((identity, profile))
    }

    async fn insert_row(&self, new: NewRecipe) -> Result<Recipe, DataError> {
        let mut t = self.tables.write().await;
        if !t.profiles.iter().any(|p| p.user_id == new.user_id) {
            return Err(DataError::Constraint("recipes_user_id_fkey".into()));
        }
        if new.name.trim().is_empty() {
            return Err(DataError::Constraint("recipes_name_check".into()));
        }
        if new.cooking_time.is_some_and(|m| m < 0) {
            return Err(DataError::Constraint("recipes_cooking_time_check".into()));
        }

        let now = OffsetDateTime::now_utc();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            name: new.name,
            image_url: new.image_url,
            ingredients: new.ingredients,
            instructions: new.instructions,
            cooking_time: new.cooking_time,
            category: new.category,
            created_at: now,
            updated_at: now,
        };
        let seq = self.seq.fetch_add(1, AtomicOrdering::SeqCst);
        t.recipes.push((seq, recipe.clone()));
        Ok(recipe)
    }
}

#[async_trait]
impl DataClient for MemoryClient {
    async fn select_recipes(&self, query: RecipeQuery) -> Result<Vec<RecipeWithAuthor>, DataError> {
        self.enter()?;
        let t = self.tables.read().await;
        let mut rows: Vec<&(u64, Recipe)> = t
            .recipes
            .iter()
            .filter(|(_, r)| query.owner.map_or(true, |owner| r.user_id == owner))
            .collect();
        rows.sort_by_key(|(seq, r)| (r.created_at, *seq));
        if query.order == Order::Desc {
            rows.reverse();
        }

        Ok(rows
            .into_iter()
            .map(|(_, r)| RecipeWithAuthor {
                recipe: r.clone(),
                author_username: t
                    .profiles
                    .iter()
                    .find(|p| p.user_id == r.user_id)
                    .map(|p| p.username.clone()),
            })
            .collect())
    }

    async fn insert_recipe(&self, caller: Uuid, recipe: NewRecipe) -> Result<Recipe, DataError> {
        self.enter()?;
        if recipe.user_id != caller {
            return Err(DataError::Forbidden);
        }
        self.insert_row(recipe).await
    }

    async fn delete_recipe(&self, caller: Uuid, recipe_id: Uuid) -> Result<u64, DataError> {
        self.enter()?;
        let mut t = self.tables.write().await;
        let before = t.recipes.len();
        t.recipes
            .retain(|(_, r)| !(r.id == recipe_id && r.user_id == caller));
        Ok((before - t.recipes.len()) as u64)
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, DataError> {
        self.enter()?;
        let t = self.tables.read().await;
        Ok(t.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }
}

#[async_trait]
impl IdentityStore for MemoryClient {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DataError> {
        self.enter()?;
        let t = self.tables.read().await;
        Ok(t.identities.iter().find(|i| i.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<IdentityRecord>, DataError> {
        self.enter()?;
        let t = self.tables.read().await;
        Ok(t.identities.iter().find(|i| i.id == id).cloned())
    }

    async fn create_with_profile(
        &self,
        new: NewIdentity,
    ) -> Result<(IdentityRecord, Profile), DataError> {
        self.enter()?;
        self.insert_identity(new).await
    }
}
