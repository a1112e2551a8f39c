/*
 * Responsibility
 * - users table access behind the `UserRepo` trait
 * - the gateway resolves identities through this on every authenticated request
 * - emails arrive already normalized; the unique index on `email` backs EmailAlreadyInUse
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::{
    BoxFuture,
    error::{RepoError, RepoResult},
};
use crate::services::auth::principal::Principal;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

pub trait UserRepo: Send + Sync {
    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, RepoResult<Option<Principal>>>;

    // Returns `RepoError::Conflict` when the email is already taken.
    fn create(&self, user: NewUser) -> BoxFuture<'_, RepoResult<Principal>>;
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
}

impl From<UserRow> for Principal {
    fn from(row: UserRow) -> Self {
        Principal::new(row.id, row.email, row.display_name, row.password_hash)
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepo for PgUserRepo {
    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, RepoResult<Option<Principal>>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, email, display_name, password_hash
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            Ok(row.map(Principal::from))
        })
    }

    fn create(&self, user: NewUser) -> BoxFuture<'_, RepoResult<Principal>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, UserRow>(
                r#"
                INSERT INTO users (id, email, display_name, password_hash)
                VALUES ($1, $2, $3, $4)
                RETURNING id, email, display_name, password_hash
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            Ok(row.into())
        })
    }
}
