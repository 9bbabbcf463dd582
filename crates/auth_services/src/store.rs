use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use uuid::Uuid;

use crate::types::{AuthError, NewUser, User};

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with [`AuthError::UsernameTaken`] on a duplicate username.
    async fn insert(&self, user: NewUser) -> Result<User, AuthError>;

    /// Looks up a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
}

/// User store backed by the `users` table.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a store over the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        let existing = sqlx::query("SELECT id FROM users WHERE username = $1")
            .bind(&user.username)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, is_admin, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UsernameTaken,
            other => AuthError::Database(other),
        })?;

        Ok(user_from_row(&row))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }
}

/// Process-local user store, used for `STORAGE=memory` and in tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);

        if users.values().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn memory_store_finds_inserted_users() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("marge")).await.unwrap();

        let by_name = store.find_by_username("marge").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.username, "marge");
        assert!(store.find_by_username("Marge").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_usernames() {
        let store = MemoryUserStore::new();
        store.insert(new_user("marge")).await.unwrap();

        assert!(matches!(
            store.insert(new_user("marge")).await,
            Err(AuthError::UsernameTaken)
        ));
    }

    async fn pg_store() -> PgUserStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = postgres::database::create_connection_pool(&url)
            .await
            .unwrap();
        postgres::database::run_migrations(&pool).await.unwrap();
        PgUserStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn pg_store_round_trips_a_user() {
        let store = pg_store().await;
        let username = format!("lisa-{}", Uuid::new_v4());

        let user = store.insert(new_user(&username)).await.unwrap();
        let found = store.find_by_username(&username).await.unwrap().unwrap();

        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash, "hash");
        assert!(!found.is_admin);
        assert!(
            store
                .find_by_username(&username.to_uppercase())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn pg_store_rejects_duplicate_usernames() {
        let store = pg_store().await;
        let username = format!("milhouse-{}", Uuid::new_v4());
        store.insert(new_user(&username)).await.unwrap();

        assert!(matches!(
            store.insert(new_user(&username)).await,
            Err(AuthError::UsernameTaken)
        ));
    }
}
