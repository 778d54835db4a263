use chrono::{DateTime, Utc};
use juniper::{FieldResult, ID};

use crate::common::{internal_error, RoleId, UserId, UserRoleId};
use crate::domains::roles::data::RoleData;
use crate::domains::roles::models::Role;
use crate::domains::user_roles::models::UserRole;
use crate::domains::users::data::UserData;
use crate::domains::users::models::User;
use crate::server::graphql::context::GraphQLContext;

#[derive(Debug, Clone)]
pub struct UserRoleData {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[juniper::graphql_object(name = "UserRole", context = GraphQLContext)]
impl UserRoleData {
    fn id(&self) -> ID {
        self.id.to_graphql()
    }

    fn user_id(&self) -> ID {
        self.user_id.to_graphql()
    }

    fn role_id(&self) -> ID {
        self.role_id.to_graphql()
    }

    fn created_by(&self) -> ID {
        self.created_by.to_graphql()
    }

    fn updated_by(&self) -> ID {
        self.updated_by.to_graphql()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Linked user; null once the user is deleted
    async fn user(&self, ctx: &GraphQLContext) -> FieldResult<Option<UserData>> {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let user = User::find_by_id(self.user_id, conn)
            .await
            .map_err(internal_error)?;
        Ok(user.map(UserData::from))
    }

    /// Linked role; null once the role is deleted
    async fn role(&self, ctx: &GraphQLContext) -> FieldResult<Option<RoleData>> {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let role = Role::find_by_id(self.role_id, conn)
            .await
            .map_err(internal_error)?;
        Ok(role.map(RoleData::from))
    }
}

impl From<UserRole> for UserRoleData {
    fn from(link: UserRole) -> Self {
        Self {
            id: link.id,
            user_id: link.user_id,
            role_id: link.role_id,
            created_by: link.created_by,
            updated_by: link.updated_by,
            created_at: link.created_at,
            updated_at: link.updated_at,
            deleted_at: link.deleted_at,
        }
    }
}
