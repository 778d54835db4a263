use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::common::{RoleId, UserId, UserRoleId};

/// Link between a user and a role
///
/// At most one live link per (user, role); unlinking soft deletes the row
/// and a later re-link inserts a fresh one.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserRole {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserRole {
    pub async fn find_by_user(user_id: UserId, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM user_roles WHERE user_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_role(role_id: RoleId, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM user_roles WHERE role_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(role_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Into::into)
    }

    /// Link `user_id` to `role_id`. `None` if they were already linked.
    pub async fn link(
        user_id: UserId,
        role_id: RoleId,
        actor: UserId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_roles (user_id, role_id, created_by, updated_by)
             VALUES ($1, $2, $3, $3)
             ON CONFLICT (user_id, role_id) WHERE deleted_at IS NULL DO NOTHING
             RETURNING *",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(actor)
        .fetch_optional(&mut *conn)
        .await
        .map_err(Into::into)
    }

    pub async fn unlink(
        user_id: UserId,
        role_id: RoleId,
        actor: UserId,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE user_roles
             SET deleted_at = NOW(), updated_by = $3, updated_at = NOW()
             WHERE user_id = $1 AND role_id = $2 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(actor)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop every live link of a deleted user
    pub async fn unlink_user(
        user_id: UserId,
        actor: UserId,
        conn: &mut PgConnection,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_roles
             SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(actor)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Drop every live link of a deleted role
    pub async fn unlink_role(
        role_id: RoleId,
        actor: UserId,
        conn: &mut PgConnection,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_roles
             SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE role_id = $1 AND deleted_at IS NULL",
        )
        .bind(role_id)
        .bind(actor)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
