use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{extractors::Session, session::Identity},
    components::{HeaderView, RecipeCard},
    error::{AppError, Result},
    profiles::{controller::ProfileController, repo_types::Profile},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub header: HeaderView,
    pub profile: Option<Profile>,
    pub recipes: Vec<RecipeCard>,
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/profile/recipes/:id", delete(delete_recipe))
}

fn render(identity: &Identity, controller: &ProfileController) -> ProfilePage {
    ProfilePage {
        header: HeaderView::new(identity, controller.profile(), None),
        profile: controller.profile().cloned(),
        recipes: controller.recipes().iter().map(RecipeCard::from).collect(),
    }
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    Session(identity): Session,
) -> Json<ProfilePage> {
    let controller = ProfileController::load(state.data.as_ref(), identity.id).await;
    Json(render(&identity, &controller))
}

/// DELETE /profile/recipes/:id?confirm=true
/// Without `confirm=true` nothing is read or written.
/// Responds with the collection as it stands after the delete.
#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Session(identity): Session,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ProfilePage>> {
    if !params.confirm {
        return Err(AppError::ConfirmationRequired);
    }

    let mut controller = ProfileController::load(state.data.as_ref(), identity.id).await;
    controller.delete(state.data.as_ref(), id, true).await?;
    Ok(Json(render(&identity, &controller)))
}
