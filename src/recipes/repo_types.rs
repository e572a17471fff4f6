use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Recipe row as stored in the `recipes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<i32>, // minutes
    pub category: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Recipe joined with its author's profile.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RecipeWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub recipe: Recipe,
    pub author_username: Option<String>,
}

/// Field set sent with an insert. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
    pub user_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<i32>,
    pub category: Option<String>,
}
