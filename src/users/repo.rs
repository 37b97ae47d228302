use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ProfileUpdate, User};
use crate::error::{AppError, Result};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; an email already on file is `DuplicateConflict`.
    async fn insert(&self, email: &str, hashed_password: &str) -> Result<User>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Option<User>>;
    /// Returns whether a row was removed.
    async fn delete(&self, user_id: Uuid) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, email: &str, hashed_password: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES ($1, $2)
            RETURNING user_id, email, hashed_password, pin_number, phone_number
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "email"))
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, hashed_password, pin_number, phone_number
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "user"))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, hashed_password, pin_number, phone_number
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "user"))
    }

    async fn list(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"SELECT user_id, email, hashed_password, pin_number, phone_number FROM users"#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "users"))
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET pin_number = COALESCE($2, pin_number),
                   phone_number = COALESCE($3, phone_number)
             WHERE user_id = $1
            RETURNING user_id, email, hashed_password, pin_number, phone_number
            "#,
        )
        .bind(user_id)
        .bind(update.pin_number.as_deref())
        .bind(update.phone_number.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "user"))
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool> {
        let res = sqlx::query(r#"DELETE FROM users WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "user"))?;
        Ok(res.rows_affected() > 0)
    }
}
