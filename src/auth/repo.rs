use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::PgStore;

/// User record as persisted. The password hash never leaves this layer except
/// through `password::verify`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the email or username is
    /// already taken; the database unique constraints make the check atomic
    /// under concurrent registrations.
    async fn insert_user(&self, user: &User) -> Result<(), ApiError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    async fn user_exists(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Delete a user and every recipe they own in one transaction.
    /// Returns false if the user did not exist.
    async fn delete_user(&self, id: Uuid) -> Result<bool, ApiError>;
}

const SELECT_USER: &str =
    "SELECT id, username, email, password_hash, created_at, updated_at FROM users";

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                // Constraint name decides which field raced.
                let msg = match db.constraint() {
                    Some(c) if c.contains("username") => {
                        "User with this username already exists"
                    }
                    _ => "User with this email already exists",
                };
                Err(ApiError::Conflict(msg.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, ApiError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.0)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipes WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
