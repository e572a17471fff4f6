//! The create-recipe form: local list editing, validation and the
//! upload-then-insert submission.
//!
//! ```text
//! Editing -> Validating -> Invalid -> Editing
//!                       -> Submitting -> Failed -> Editing
//!                                     -> Succeeded
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    data::DataClient,
    error::AppError,
    images::services::{ext_from_mime, ImageUpload},
    recipes::{repo_types::Recipe, services::publish_recipe},
    storage::StorageClient,
};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;

/// Offered in the category picker. Anything else is accepted too.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Breakfast",
    "Lunch",
    "Dinner",
    "Appetizer",
    "Soup",
    "Salad",
    "Dessert",
    "Snack",
    "Beverage",
];

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Editing,
    Validating,
    Invalid,
    Submitting,
    Failed,
    Succeeded,
}

/// Output of a successful validation, ready to publish.
#[derive(Debug, Clone)]
pub struct ValidRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<i32>,
    pub category: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRecipeForm {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    pub category: String,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
    state: FormState,
    errors: FieldErrors,
}

impl Default for CreateRecipeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateRecipeForm {
    /// Blank form with one empty ingredient and one empty step.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            ingredients: vec![String::new()],
            instructions: vec![String::new()],
            cooking_time: String::new(),
            category: String::new(),
            image: None,
            state: FormState::Editing,
            errors: FieldErrors::default(),
        }
    }

    /// Form as read back from a submission: lists start empty and are
    /// filled entry by entry.
    pub fn from_submission() -> Self {
        Self {
            ingredients: Vec::new(),
            instructions: Vec::new(),
            ..Self::new()
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn edited(&mut self) {
        if matches!(self.state, FormState::Invalid | FormState::Failed) {
            self.state = FormState::Editing;
        }
    }

    pub fn add_ingredient(&mut self) {
        self.edited();
        self.ingredients.push(String::new());
    }

    /// Refuses to remove the last remaining entry.
    pub fn remove_ingredient(&mut self, index: usize) -> bool {
        self.edited();
        remove_entry(&mut self.ingredients, index)
    }

    pub fn add_instruction(&mut self) {
        self.edited();
        self.instructions.push(String::new());
    }

    pub fn remove_instruction(&mut self, index: usize) -> bool {
        self.edited();
        remove_entry(&mut self.instructions, index)
    }

    /// Checks the form without touching its state.
    pub fn validate(&self, max_image_bytes: usize) -> Result<ValidRecipe, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        let name_len = name.chars().count();
        if name_len < NAME_MIN_CHARS {
            errors.add("name", format!("Name must be at least {NAME_MIN_CHARS} characters"));
        } else if name_len > NAME_MAX_CHARS {
            errors.add("name", format!("Name must be at most {NAME_MAX_CHARS} characters"));
        }

        let ingredients = non_blank(&self.ingredients);
        if ingredients.is_empty() {
            errors.add("ingredients", "Add at least one ingredient");
        }

        let instructions = non_blank(&self.instructions);
        if instructions.is_empty() {
            errors.add("instructions", "Add at least one instruction");
        }

        let cooking_time = match self.cooking_time.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(minutes) if minutes >= 0 => Some(minutes),
                _ => {
                    errors.add("cooking_time", "Cooking time must be a whole number of minutes");
                    None
                }
            },
        };

        let category = Some(self.category.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        if let Some(image) = &self.image {
            if ext_from_mime(&image.content_type).is_none() {
                errors.add("image", "Image must be a JPEG, PNG, WebP, GIF or HEIC file");
            } else if image.body.len() > max_image_bytes {
                errors.add(
                    "image",
                    format!("Image must be at most {} KB", max_image_bytes / 1024),
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidRecipe {
            name: name.to_string(),
            ingredients,
            instructions,
            cooking_time,
            category,
            image: self.image.clone(),
        })
    }

    /// Validates, then uploads the image (if any) and inserts the recipe.
    /// Invalid input never reaches the network; any remote failure aborts
    /// the whole submission.
    pub async fn submit(
        &mut self,
        owner: Uuid,
        data: &dyn DataClient,
        storage: &dyn StorageClient,
        max_image_bytes: usize,
    ) -> Result<Recipe, AppError> {
        self.state = FormState::Validating;
        let valid = match self.validate(max_image_bytes) {
            Ok(v) => v,
            Err(errors) => {
                warn!(%owner, fields = errors.len(), "recipe form rejected");
                self.state = FormState::Invalid;
                self.errors = errors.clone();
                return Err(AppError::Validation(errors));
            }
        };
        self.errors = FieldErrors::default();

        self.state = FormState::Submitting;
        match publish_recipe(data, storage, owner, valid).await {
            Ok(recipe) => {
                info!(%owner, recipe_id = %recipe.id, "recipe published");
                self.state = FormState::Succeeded;
                Ok(recipe)
            }
            Err(e) => {
                self.state = FormState::Failed;
                Err(AppError::CreateFailed(e))
            }
        }
    }
}

fn remove_entry(list: &mut Vec<String>, index: usize) -> bool {
    if list.len() <= 1 || index >= list.len() {
        return false;
    }
    list.remove(index);
    true
}

fn non_blank(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| !e.trim().is_empty())
        .cloned()
        .collect()
}
