//! Data-access client for the hosted relational store.
//!
//! Handlers and page controllers only talk to [`DataClient`]; the Postgres
//! adapter lives in [`crate::db`] and an in-process one in [`memory`].

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    profiles::repo_types::Profile,
    recipes::repo_types::{NewRecipe, Recipe, RecipeWithAuthor},
};

pub mod memory;

pub use memory::MemoryClient;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("write rejected by row-level policy")]
    Forbidden,

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

/// Select over `recipes`, joined with the author's profile and ordered by
/// `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecipeQuery {
    /// Equality filter on `user_id`.
    pub owner: Option<Uuid>,
    pub order: Order,
}

impl RecipeQuery {
    /// Every recipe, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// One owner's recipes, newest first.
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            owner: Some(user_id),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait DataClient: Send + Sync {
    async fn select_recipes(&self, query: RecipeQuery) -> Result<Vec<RecipeWithAuthor>, DataError>;

    /// Inserts on behalf of `caller`. Rejected unless `recipe.user_id == caller`.
    async fn insert_recipe(&self, caller: Uuid, recipe: NewRecipe) -> Result<Recipe, DataError>;

    /// Deletes the recipe if `caller` owns it. Returns the number of rows removed;
    /// zero is not an error.
    async fn delete_recipe(&self, caller: Uuid, recipe_id: Uuid) -> Result<u64, DataError>;

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, DataError>;
}
