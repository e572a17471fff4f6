use uuid::Uuid;

use crate::{
    data::{DataClient, RecipeQuery},
    images::services::upload_recipe_image,
    recipes::{
        form::ValidRecipe,
        repo_types::{NewRecipe, Recipe, RecipeWithAuthor},
    },
    storage::StorageClient,
};

/// Runs a list query for a page. Failures are logged and read as "no recipes".
pub async fn load_recipes(data: &dyn DataClient, query: RecipeQuery) -> Vec<RecipeWithAuthor> {
    match data.select_recipes(query).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, owner = ?query.owner, "fetch recipes failed");
            Vec::new()
        }
    }
}

/// Upload, then insert. The two steps are independent: if the insert fails
/// the uploaded image stays in the bucket.
pub async fn publish_recipe(
    data: &dyn DataClient,
    storage: &dyn StorageClient,
    owner: Uuid,
    recipe: ValidRecipe,
) -> anyhow::Result<Recipe> {
    let image_url = match recipe.image {
        Some(image) => Some(upload_recipe_image(storage, owner, image).await?),
        None => None,
    };

    let created = data
        .insert_recipe(
            owner,
            NewRecipe {
                user_id: owner,
                name: recipe.name,
                image_url,
                ingredients: recipe.ingredients,
                instructions: recipe.instructions,
                cooking_time: recipe.cooking_time,
                category: recipe.category,
            },
        )
        .await?;
    Ok(created)
}
