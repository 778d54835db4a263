use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::common::{RoleId, UserId};

/// User model - SQL persistence layer
///
/// Rows are soft deleted; every finder ignores rows with `deleted_at` set.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub password_hash: String,

    // Audit
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Columns for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

impl User {
    pub async fn find_by_id(id: UserId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(Into::into)
    }

    /// Find by login name
    pub async fn find_by_name(name: &str, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE name = $1 AND deleted_at IS NULL")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(&mut *conn)
            .await
            .map_err(Into::into)
    }

    /// Users currently linked to a role
    pub async fn find_by_role(role_id: RoleId, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT u.*
             FROM users u
             JOIN user_roles ur ON ur.user_id = u.id
             WHERE ur.role_id = $1
               AND ur.deleted_at IS NULL
               AND u.deleted_at IS NULL
             ORDER BY u.id",
        )
        .bind(role_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Into::into)
    }

    pub async fn insert(new: &NewUser, actor: UserId, conn: &mut PgConnection) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (name, phone, password_hash, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .bind(actor)
        .fetch_one(&mut *conn)
        .await
        .map_err(Into::into)
    }

    /// Apply `changes`; `None` if the user doesn't exist
    pub async fn update(
        id: UserId,
        changes: &UserChanges,
        actor: UserId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE users
             SET name = COALESCE($2, name),
                 phone = COALESCE($3, phone),
                 password_hash = COALESCE($4, password_hash),
                 updated_by = $5,
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.password_hash)
        .bind(actor)
        .fetch_optional(&mut *conn)
        .await
        .map_err(Into::into)
    }

    /// Mark deleted. Returns false if there was nothing to delete.
    pub async fn soft_delete(id: UserId, actor: UserId, conn: &mut PgConnection) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users
             SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
