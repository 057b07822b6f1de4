use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::services::{get_user_entity, user_exists};
use crate::error::ApiError;
use crate::recipes::{
    dto::{CreateRecipe, RecipeView, UpdateRecipe},
    repo::{Recipe, RecipeWithOwner},
};
use crate::store::Store;

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Option<i32>) -> Result<(), ApiError> {
    if matches!(value, Some(v) if v < 0) {
        return Err(ApiError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Treats an empty string as "clear to empty" and anything else as a new
/// value; callers skip the field entirely to leave it unchanged.
fn apply_text(target: &mut Option<String>, update: Option<String>) {
    if let Some(value) = update {
        *target = if value.is_empty() { None } else { Some(value) };
    }
}

/// Create a recipe owned by `owner_id`. Ingredient and instruction order is
/// stored exactly as given.
pub async fn create(
    store: &dyn Store,
    owner_id: Uuid,
    fields: CreateRecipe,
) -> Result<RecipeView, ApiError> {
    validate_title(&fields.title)?;
    validate_non_negative("cookingTime", fields.cooking_time)?;
    validate_non_negative("servings", fields.servings)?;

    // Propagates NotFound if the owner reference is dangling.
    let owner = get_user_entity(store, owner_id).await?;

    let now = OffsetDateTime::now_utc();
    let recipe = Recipe {
        id: Uuid::new_v4(),
        owner_id,
        title: fields.title,
        description: fields.description.filter(|d| !d.is_empty()),
        ingredients: fields.ingredients,
        instructions: fields.instructions,
        cooking_time: fields.cooking_time,
        servings: fields.servings,
        image_url: fields.image_url.filter(|u| !u.is_empty()),
        created_at: now,
        updated_at: now,
    };
    store.insert_recipe(&recipe).await?;

    info!(recipe_id = %recipe.id, owner_id = %owner_id, "recipe created");
    Ok(RecipeView::from(RecipeWithOwner {
        recipe,
        owner_username: owner.username,
    }))
}

/// Apply a partial update. Only the owner may update; absent fields stay
/// unchanged, and `updated_at` is refreshed.
pub async fn update(
    store: &dyn Store,
    recipe_id: Uuid,
    caller_id: Uuid,
    fields: UpdateRecipe,
) -> Result<RecipeView, ApiError> {
    let mut recipe = store
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;

    if recipe.owner_id != caller_id {
        warn!(recipe_id = %recipe_id, caller_id = %caller_id, "update by non-owner");
        return Err(ApiError::Forbidden(
            "You are not authorized to update this recipe".into(),
        ));
    }

    if let Some(title) = fields.title {
        // The title is required, so it cannot be cleared.
        if !title.is_empty() {
            validate_title(&title)?;
            recipe.title = title;
        }
    }
    apply_text(&mut recipe.description, fields.description);
    apply_text(&mut recipe.image_url, fields.image_url);
    if let Some(ingredients) = fields.ingredients {
        recipe.ingredients = ingredients;
    }
    if let Some(instructions) = fields.instructions {
        recipe.instructions = instructions;
    }
    if let Some(cooking_time) = fields.cooking_time {
        validate_non_negative("cookingTime", cooking_time)?;
        recipe.cooking_time = cooking_time;
    }
    if let Some(servings) = fields.servings {
        validate_non_negative("servings", servings)?;
        recipe.servings = servings;
    }
    recipe.updated_at = OffsetDateTime::now_utc();

    store.update_recipe(&recipe).await?;

    let owner = get_user_entity(store, recipe.owner_id).await?;
    info!(recipe_id = %recipe_id, "recipe updated");
    Ok(RecipeView::from(RecipeWithOwner {
        recipe,
        owner_username: owner.username,
    }))
}

/// Delete a recipe. Only the owner may delete.
pub async fn delete(store: &dyn Store, recipe_id: Uuid, caller_id: Uuid) -> Result<bool, ApiError> {
    let recipe = store
        .recipe_by_id(recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;

    if recipe.owner_id != caller_id {
        warn!(recipe_id = %recipe_id, caller_id = %caller_id, "delete by non-owner");
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this recipe".into(),
        ));
    }

    store.delete_recipe(recipe_id).await?;
    info!(recipe_id = %recipe_id, "recipe deleted");
    Ok(true)
}

/// Public read; the owner's username is resolved at read time.
pub async fn get_by_id(store: &dyn Store, recipe_id: Uuid) -> Result<RecipeView, ApiError> {
    store
        .recipe_with_owner(recipe_id)
        .await?
        .map(RecipeView::from)
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))
}

/// Every recipe, newest first.
pub async fn get_all(store: &dyn Store) -> Result<Vec<RecipeView>, ApiError> {
    let rows = store.list_recipes().await?;
    Ok(rows.into_iter().map(RecipeView::from).collect())
}

/// One owner's recipes, newest first. Fails if the owner does not exist.
pub async fn get_by_owner(store: &dyn Store, owner_id: Uuid) -> Result<Vec<RecipeView>, ApiError> {
    if !user_exists(store, owner_id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }
    let rows = store.list_recipes_by_owner(owner_id).await?;
    Ok(rows.into_iter().map(RecipeView::from).collect())
}
