//! In-memory store for service-level tests. Each test builds its own
//! [`MemStore`] so no state is shared between cases.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{User, UserStore};
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::recipes::repo::{Recipe, RecipeStore, RecipeWithOwner};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    recipes: Vec<Recipe>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_owner(&self, inner: &Inner, recipe: &Recipe) -> RecipeWithOwner {
        let owner_username = inner
            .users
            .iter()
            .find(|u| u.id == recipe.owner_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        RecipeWithOwner {
            recipe: recipe.clone(),
            owner_username,
        }
    }

    fn sorted_views(&self, inner: &Inner, owner: Option<Uuid>) -> Vec<RecipeWithOwner> {
        let mut rows: Vec<&Recipe> = inner
            .recipes
            .iter()
            .filter(|r| owner.map_or(true, |o| r.owner_id == o))
            .collect();
        // Stable sort: equal timestamps keep insertion order.
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().map(|r| self.with_owner(inner, r)).collect()
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::Conflict("User with this email already exists".into()));
        }
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(ApiError::Conflict(
                "User with this username already exists".into(),
            ));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().any(|u| u.id == id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.recipes.retain(|r| r.owner_id != id);
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }
}

#[async_trait]
impl RecipeStore for MemStore {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.recipes.push(recipe.clone());
        Ok(())
    }

    async fn recipe_by_id(&self, id: Uuid) -> Result<Option<Recipe>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn recipe_with_owner(&self, id: Uuid) -> Result<Option<RecipeWithOwner>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .recipes
            .iter()
            .find(|r| r.id == id)
            .map(|r| self.with_owner(&inner, r)))
    }

    async fn list_recipes(&self) -> Result<Vec<RecipeWithOwner>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(self.sorted_views(&inner, None))
    }

    async fn list_recipes_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<RecipeWithOwner>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(self.sorted_views(&inner, Some(owner_id)))
    }

    async fn update_recipe(&self, recipe: &Recipe) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.recipes.iter_mut().find(|r| r.id == recipe.id) {
            *existing = recipe.clone();
        }
        Ok(())
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.recipes.len();
        inner.recipes.retain(|r| r.id != id);
        Ok(inner.recipes.len() < before)
    }
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::from(&JwtConfig {
        secret: "test-secret".into(),
        issuer: "test-issuer".into(),
        audience: "test-aud".into(),
        ttl_minutes: 5,
    })
}

/// Insert a user directly, bypassing registration. Returns the new id.
pub async fn seed_user(store: &MemStore, username: &str, email: &str) -> Uuid {
    let now = OffsetDateTime::now_utc();
    let user = User {
        id: Uuid::new_v4(),
        username: username.into(),
        email: email.into(),
        password_hash: "unused-in-tests".into(),
        created_at: now,
        updated_at: now,
    };
    let id = user.id;
    store.insert_user(&user).await.expect("seed user");
    id
}
