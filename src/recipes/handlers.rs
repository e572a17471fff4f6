use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{extractors::Session, session::Identity},
    components::{HeaderView, RecipeCard, RecipeDetail},
    error::{AppError, Result},
    images::services::ImageUpload,
    profiles::repo_types::Profile,
    recipes::{
        dto::{FeedPage, FeedParams, NewRecipePage},
        feed::FeedController,
        form::{CreateRecipeForm, SUGGESTED_CATEGORIES},
        repo_types::Recipe,
    },
    state::AppState,
};

/// Where a successful publish sends the author.
pub const AFTER_CREATE: &str = "/profile";

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/feed", get(feed))
        .route("/recipes/new", get(new_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// Profile for the header. A failed lookup only costs the display name.
pub(crate) async fn header_profile(state: &AppState, identity: &Identity) -> Option<Profile> {
    match state.data.profile_by_user(identity.id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, user_id = %identity.id, "profile lookup failed");
            None
        }
    }
}

#[instrument(skip(state))]
pub async fn feed(
    State(state): State<AppState>,
    Session(identity): Session,
    Query(params): Query<FeedParams>,
) -> Json<FeedPage> {
    let mut controller = FeedController::load(state.data.as_ref()).await;
    controller.set_query(params.q);
    if let Some(id) = params.selected {
        controller.select(id);
    }

    let profile = header_profile(&state, &identity).await;
    Json(FeedPage {
        header: HeaderView::new(&identity, profile.as_ref(), Some(controller.query())),
        recipes: controller.visible().into_iter().map(RecipeCard::from).collect(),
        detail: RecipeDetail::render(controller.selected()),
    })
}

#[instrument(skip(state))]
pub async fn new_recipe(
    State(state): State<AppState>,
    Session(identity): Session,
) -> Json<NewRecipePage> {
    let profile = header_profile(&state, &identity).await;
    let form = CreateRecipeForm::new();
    Json(NewRecipePage {
        header: HeaderView::new(&identity, profile.as_ref(), None),
        state: form.state(),
        errors: form.errors().clone(),
        form,
        suggested_categories: SUGGESTED_CATEGORIES,
    })
}

/// POST /recipes (multipart)
/// Fields: name, ingredients (repeated), instructions (repeated),
/// cooking_time, category, image (file, optional)
#[instrument(skip(state, mp))]
pub async fn create_recipe(
    State(state): State<AppState>,
    Session(identity): Session,
    mp: Multipart,
) -> Result<(StatusCode, HeaderMap, Json<Recipe>)> {
    let mut form = read_form(mp).await?;

    let recipe = form
        .submit(
            identity.id,
            state.data.as_ref(),
            state.storage.as_ref(),
            state.config.max_image_bytes,
        )
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, HeaderValue::from_static(AFTER_CREATE));
    Ok((StatusCode::CREATED, headers, Json(recipe)))
}

async fn read_form(mut mp: Multipart) -> Result<CreateRecipeForm> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        warn!(error = %e, "malformed recipe form");
        AppError::InvalidInput("Malformed form data".into())
    };

    let mut form = CreateRecipeForm::from_submission();

    while let Some(field) = mp.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let body = field.bytes().await.map_err(malformed)?;
                // an empty file part means no file was picked
                if !body.is_empty() {
                    form.image = Some(ImageUpload { body, content_type });
                }
            }
            "name" => form.name = field.text().await.map_err(malformed)?,
            "ingredients" | "ingredients[]" => {
                form.ingredients.push(field.text().await.map_err(malformed)?)
            }
            "instructions" | "instructions[]" => {
                form.instructions.push(field.text().await.map_err(malformed)?)
            }
            "cooking_time" => form.cooking_time = field.text().await.map_err(malformed)?,
            "category" => form.category = field.text().await.map_err(malformed)?,
            other => warn!(field = %other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}
