use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::User,
};
use crate::error::ApiError;
use crate::store::Store;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Register a new user and hand back their public view plus a token.
///
/// The email conflict is checked before the username conflict. The pre-checks
/// give friendly errors; the unique constraints in the store close the race
/// between two concurrent registrations.
pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    if store.user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("User with this email already exists".into()));
    }
    if store.user_by_username(&username).await?.is_some() {
        warn!(username = %username, "username already registered");
        return Err(ApiError::Conflict(
            "User with this username already exists".into(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let user = User {
        id: Uuid::new_v4(),
        username,
        email,
        password_hash: hash_password(&req.password)?,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await?;

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(AuthResponse {
        user: PublicUser::from(&user),
        token,
    })
}

/// Authenticate by email and password.
///
/// Unknown email and wrong password both fail with `InvalidCredentials` so the
/// response does not reveal which check failed.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    let Some(user) = store.user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        user: PublicUser::from(&user),
        token,
    })
}

/// Public view of a user by id.
pub async fn get_user(store: &dyn Store, user_id: Uuid) -> Result<PublicUser, ApiError> {
    let user = get_user_entity(store, user_id).await?;
    Ok(PublicUser::from(&user))
}

/// Used by other services to validate foreign references. Never fails on
/// absence, only on storage trouble.
pub async fn user_exists(store: &dyn Store, user_id: Uuid) -> Result<bool, ApiError> {
    store.user_exists(user_id).await
}

/// Full record, hash included. Internal use only (e.g. resolving an owner's
/// username for a recipe view).
pub async fn get_user_entity(store: &dyn Store, user_id: Uuid) -> Result<User, ApiError> {
    store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// Delete the caller's account together with all their recipes.
pub async fn delete_account(store: &dyn Store, user_id: Uuid) -> Result<(), ApiError> {
    if !store.delete_user(user_id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %user_id, "account deleted");
    Ok(())
}
