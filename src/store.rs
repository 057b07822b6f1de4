use sqlx::PgPool;

use crate::auth::repo::UserStore;
use crate::recipes::repo::RecipeStore;

/// Storage seam for the whole app. Production uses [`PgStore`]; tests build an
/// isolated in-memory store per test so state never leaks between cases.
pub trait Store: UserStore + RecipeStore {}

impl<T: UserStore + RecipeStore> Store for T {}

/// Postgres-backed store. The trait impls live next to the record types they
/// persist (`auth::repo`, `recipes::repo`).
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
