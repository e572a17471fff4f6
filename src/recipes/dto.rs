use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    components::{HeaderView, RecipeCard, RecipeDetail},
    recipes::form::{CreateRecipeForm, FieldErrors, FormState},
};

#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub selected: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub header: HeaderView,
    pub recipes: Vec<RecipeCard>,
    pub detail: Option<RecipeDetail>,
}

#[derive(Debug, Serialize)]
pub struct NewRecipePage {
    pub header: HeaderView,
    pub state: FormState,
    pub form: CreateRecipeForm,
    pub errors: FieldErrors,
    pub suggested_categories: &'static [&'static str],
}
