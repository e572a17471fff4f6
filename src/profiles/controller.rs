use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    data::{DataClient, RecipeQuery},
    error::AppError,
    profiles::repo_types::Profile,
    recipes::{repo_types::RecipeWithAuthor, services::load_recipes},
};

/// The signed-in user's own collection.
#[derive(Debug)]
pub struct ProfileController {
    owner: Uuid,
    profile: Option<Profile>,
    recipes: Vec<RecipeWithAuthor>,
}

impl ProfileController {
    pub async fn load(data: &dyn DataClient, owner: Uuid) -> Self {
        let recipes = load_recipes(data, RecipeQuery::owned_by(owner)).await;
        let profile = match data.profile_by_user(owner).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, %owner, "profile lookup failed");
                None
            }
        };
        Self {
            owner,
            profile,
            recipes,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn recipes(&self) -> &[RecipeWithAuthor] {
        &self.recipes
    }

    /// Deletes one of the owner's recipes once the user has confirmed.
    /// The list only changes after the store reports success; a recipe that
    /// is already gone counts as deleted.
    pub async fn delete(
        &mut self,
        data: &dyn DataClient,
        recipe_id: Uuid,
        confirmed: bool,
    ) -> Result<(), AppError> {
        if !confirmed {
            return Err(AppError::ConfirmationRequired);
        }

        let removed = data
            .delete_recipe(self.owner, recipe_id)
            .await
            .map_err(AppError::DeleteFailed)?;
        if removed == 0 {
            debug!(owner = %self.owner, %recipe_id, "delete matched no rows");
        } else {
            info!(owner = %self.owner, %recipe_id, "recipe deleted");
        }

        self.recipes.retain(|r| r.recipe.id != recipe_id);
        Ok(())
    }
}
