//! GraphQL data types for roles

use chrono::{DateTime, Utc};
use juniper::{FieldResult, GraphQLInputObject, ID};

use crate::common::{internal_error, RoleId, UserId};
use crate::domains::roles::models::Role;
use crate::domains::user_roles::data::UserRoleData;
use crate::domains::user_roles::models::UserRole;
use crate::domains::users::data::UserData;
use crate::domains::users::models::User;
use crate::server::graphql::context::GraphQLContext;

#[derive(Debug, Clone)]
pub struct RoleData {
    pub id: RoleId,
    pub name: String,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[juniper::graphql_object(name = "Role", context = GraphQLContext)]
impl RoleData {
    fn id(&self) -> ID {
        self.id.to_graphql()
    }

    fn name(&self) -> &str {
        &self.name
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

    /// Users holding this role
    async fn users(&self, ctx: &GraphQLContext) -> FieldResult<Vec<UserData>> {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let users = User::find_by_role(self.id, conn)
            .await
            .map_err(internal_error)?;
        Ok(users.into_iter().map(UserData::from).collect())
    }

    async fn user_roles(&self, ctx: &GraphQLContext) -> FieldResult<Vec<UserRoleData>> {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let links = UserRole::find_by_role(self.id, conn)
            .await
            .map_err(internal_error)?;
        Ok(links.into_iter().map(UserRoleData::from).collect())
    }
}

impl From<Role> for RoleData {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_by: r.created_by,
            updated_by: r.updated_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CreateRoleInput {
    pub name: String,
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct UpdateRoleInput {
    pub name: Option<String>,
}
