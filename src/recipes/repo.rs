use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::PgStore;

/// Recipe record as persisted. Ingredients and instructions are native
/// `TEXT[]` columns so element order survives storage exactly.
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<i32>,
    pub servings: Option<i32>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A recipe joined with its owner's current username, resolved at read time.
#[derive(Debug, Clone)]
pub struct RecipeWithOwner {
    pub recipe: Recipe,
    pub owner_username: String,
}

#[derive(Debug, FromRow)]
struct RecipeOwnerRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: Option<i32>,
    pub servings: Option<i32>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub owner_username: String,
}

impl From<RecipeOwnerRow> for RecipeWithOwner {
    fn from(r: RecipeOwnerRow) -> Self {
        Self {
            recipe: Recipe {
                id: r.id,
                owner_id: r.owner_id,
                title: r.title,
                description: r.description,
                ingredients: r.ingredients,
                instructions: r.instructions,
                cooking_time: r.cooking_time,
                servings: r.servings,
                image_url: r.image_url,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            owner_username: r.owner_username,
        }
    }
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), ApiError>;

    async fn recipe_by_id(&self, id: Uuid) -> Result<Option<Recipe>, ApiError>;

    async fn recipe_with_owner(&self, id: Uuid) -> Result<Option<RecipeWithOwner>, ApiError>;

    /// All recipes, newest first. Rows with equal `created_at` keep insertion
    /// order.
    async fn list_recipes(&self) -> Result<Vec<RecipeWithOwner>, ApiError>;

    async fn list_recipes_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<RecipeWithOwner>, ApiError>;

    /// Full-row update keyed by `recipe.id`. The partial-update merge happens
    /// in the service layer.
    async fn update_recipe(&self, recipe: &Recipe) -> Result<(), ApiError>;

    /// Returns false if the recipe did not exist.
    async fn delete_recipe(&self, id: Uuid) -> Result<bool, ApiError>;
}

const SELECT_JOINED: &str = r#"
    SELECT r.id, r.owner_id, r.title, r.description, r.ingredients, r.instructions,
           r.cooking_time, r.servings, r.image_url, r.created_at, r.updated_at,
           u.username AS owner_username
    FROM recipes r
    JOIN users u ON u.id = r.owner_id
"#;

#[async_trait]
impl RecipeStore for PgStore {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO recipes (id, owner_id, title, description, ingredients, instructions,
                                 cooking_time, servings, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(recipe.id)
        .bind(recipe.owner_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.cooking_time)
        .bind(recipe.servings)
        .bind(&recipe.image_url)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recipe_by_id(&self, id: Uuid) -> Result<Option<Recipe>, ApiError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, owner_id, title, description, ingredients, instructions,
                   cooking_time, servings, image_url, created_at, updated_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn recipe_with_owner(&self, id: Uuid) -> Result<Option<RecipeWithOwner>, ApiError> {
        let row = sqlx::query_as::<_, RecipeOwnerRow>(&format!("{SELECT_JOINED} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_recipes(&self) -> Result<Vec<RecipeWithOwner>, ApiError> {
        // seq is a BIGSERIAL tiebreaker: equal timestamps come back in
        // insertion order.
        let rows = sqlx::query_as::<_, RecipeOwnerRow>(&format!(
            "{SELECT_JOINED} ORDER BY r.created_at DESC, r.seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_recipes_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<RecipeWithOwner>, ApiError> {
        let rows = sqlx::query_as::<_, RecipeOwnerRow>(&format!(
            "{SELECT_JOINED} WHERE r.owner_id = $1 ORDER BY r.created_at DESC, r.seq ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_recipe(&self, recipe: &Recipe) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE recipes
            SET title = $2, description = $3, ingredients = $4, instructions = $5,
                cooking_time = $6, servings = $7, image_url = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.cooking_time)
        .bind(recipe.servings)
        .bind(&recipe.image_url)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<bool, ApiError> {
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
