use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::repo::RecipeWithOwner;

/// Body for creating a recipe. List order is meaningful and round-trips
/// exactly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub cooking_time: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial update. Absent fields stay unchanged. For text fields an empty
/// string clears the value; for numerics an explicit `null` clears, which is
/// why they are double-optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipe {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cooking_time: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub servings: Option<Option<i32>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Distinguishes a field that was sent as `null` (`Some(None)`) from one that
/// was not sent at all (`None`, via the `default`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Externally visible recipe shape, owner username included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<i32>,
    pub servings: Option<i32>,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    pub owner_username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<RecipeWithOwner> for RecipeView {
    fn from(r: RecipeWithOwner) -> Self {
        Self {
            id: r.recipe.id,
            title: r.recipe.title,
            description: r.recipe.description,
            ingredients: r.recipe.ingredients,
            instructions: r.recipe.instructions,
            cooking_time: r.recipe.cooking_time,
            servings: r.recipe.servings,
            image_url: r.recipe.image_url,
            owner_id: r.recipe.owner_id,
            owner_username: r.owner_username,
            created_at: r.recipe.created_at,
            updated_at: r.recipe.updated_at,
        }
    }
}
