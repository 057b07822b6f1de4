use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    recipes::{
        dto::{CreateRecipe, RecipeView, UpdateRecipe},
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .route("/recipes/user", get(list_own_recipes))
        .route("/recipes/:id", axum::routing::put(update_recipe).delete(delete_recipe))
}

#[instrument(skip(state))]
async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<RecipeView>>, ApiError> {
    let recipes = services::get_all(state.store.as_ref()).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeView>, ApiError> {
    let recipe = services::get_by_id(state.store.as_ref(), id).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state))]
async fn list_own_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<RecipeView>>, ApiError> {
    let recipes = services::get_by_owner(state.store.as_ref(), user_id).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state, payload))]
async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRecipe>,
) -> Result<(StatusCode, HeaderMap, Json<RecipeView>), ApiError> {
    let recipe = services::create(state.store.as_ref(), user_id, payload).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/recipes/{}", recipe.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(recipe)))
}

#[instrument(skip(state, payload))]
async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipe>,
) -> Result<Json<RecipeView>, ApiError> {
    let recipe = services::update(state.store.as_ref(), id, user_id, payload).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state))]
async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<bool>, ApiError> {
    let deleted = services::delete(state.store.as_ref(), id, user_id).await?;
    Ok(Json(deleted))
}
