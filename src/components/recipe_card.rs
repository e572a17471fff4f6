use serde::Serialize;
use uuid::Uuid;

use crate::recipes::repo_types::RecipeWithAuthor;

/// Feed/profile tile for one recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeCard {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub cooking_time: Option<i32>,
    pub category: Option<String>,
    pub ingredient_count: usize,
}

impl From<&RecipeWithAuthor> for RecipeCard {
    fn from(r: &RecipeWithAuthor) -> Self {
        Self {
            id: r.recipe.id,
            name: r.recipe.name.clone(),
            image_url: r.recipe.image_url.clone(),
            author: r.author_username.clone(),
            cooking_time: r.recipe.cooking_time,
            category: r.recipe.category.clone(),
            ingredient_count: r.recipe.ingredients.len(),
        }
    }
}
