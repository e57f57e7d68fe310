use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::row_helpers::map_user_row;
use super::{unique_or, NotFoundError};
use crate::models::{AccessStatus, Role, User};

/// User database operations
pub struct UserRepo;

impl UserRepo {
    pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    pub async fn get_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        full_name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        status: AccessStatus,
    ) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, role, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| unique_or(e, "A user with this email already exists"))?;

        Self::get(pool, &id)
            .await?
            .context("User not found after creation")
    }

    pub async fn set_access(
        pool: &Pool<Sqlite>,
        id: &str,
        role: Role,
        status: AccessStatus,
    ) -> Result<User> {
        let result = sqlx::query("UPDATE users SET role = ?, status = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(status.as_str())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("User", id).into());
        }

        Self::get(pool, id)
            .await?
            .context("User not found after update")
    }
}
