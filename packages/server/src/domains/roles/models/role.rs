use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::common::{RoleId, UserId};

/// Role model - SQL persistence layer
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    pub async fn find_by_id(id: RoleId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_name(name: &str, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE name = $1 AND deleted_at IS NULL")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(&mut *conn)
            .await
            .map_err(Into::into)
    }

    /// Roles currently linked to a user
    pub async fn find_by_user(user_id: UserId, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT r.*
             FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
               AND ur.deleted_at IS NULL
               AND r.deleted_at IS NULL
             ORDER BY r.id",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Into::into)
    }

    pub async fn insert(name: &str, actor: UserId, conn: &mut PgConnection) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO roles (name, created_by, updated_by)
             VALUES ($1, $2, $2)
             RETURNING *",
        )
        .bind(name)
        .bind(actor)
        .fetch_one(&mut *conn)
        .await
        .map_err(Into::into)
    }

    pub async fn update(
        id: RoleId,
        name: Option<&str>,
        actor: UserId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE roles
             SET name = COALESCE($2, name), updated_by = $3, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(actor)
        .fetch_optional(&mut *conn)
        .await
        .map_err(Into::into)
    }

    pub async fn soft_delete(id: RoleId, actor: UserId, conn: &mut PgConnection) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE roles
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
