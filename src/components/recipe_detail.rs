use serde::Serialize;
use uuid::Uuid;

use crate::recipes::repo_types::RecipeWithAuthor;

/// One numbered instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub number: usize,
    pub text: String,
}

/// Detail modal for a selected recipe. Ingredients are a bullet list;
/// instructions are numbered from 1 in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<Step>,
}

impl RecipeDetail {
    /// Nothing selected renders nothing.
    pub fn render(selected: Option<&RecipeWithAuthor>) -> Option<Self> {
        let r = selected?;
        Some(Self {
            id: r.recipe.id,
            name: r.recipe.name.clone(),
            image_url: r.recipe.image_url.clone(),
            author: r.author_username.clone(),
            cooking_time: r.recipe.cooking_time,
            category: r.recipe.category.clone(),
            ingredients: r.recipe.ingredients.clone(),
            instructions: r
                .recipe
                .instructions
                .iter()
                .enumerate()
                .map(|(i, text)| Step {
                    number: i + 1,
                    text: text.clone(),
                })
                .collect(),
        })
    }
}
