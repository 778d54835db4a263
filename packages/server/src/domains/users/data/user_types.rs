//! GraphQL data types for users

use chrono::{DateTime, Utc};
use juniper::{FieldResult, GraphQLInputObject, ID};

use crate::common::{internal_error, UserId};
use crate::domains::roles::data::RoleData;
use crate::domains::roles::models::Role;
use crate::domains::user_roles::data::UserRoleData;
use crate::domains::user_roles::models::UserRole;
use crate::domains::users::models::User;
use crate::server::graphql::context::GraphQLContext;

/// GraphQL type for User
///
/// The password digest never leaves the model.
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[juniper::graphql_object(name = "User", context = GraphQLContext)]
impl UserData {
    fn id(&self) -> ID {
        self.id.to_graphql()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn phone(&self) -> &str {
        &self.phone
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

    /// Roles linked to this user
    async fn roles(&self, ctx: &GraphQLContext) -> FieldResult<Vec<RoleData>> {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let roles = Role::find_by_user(self.id, conn)
            .await
            .map_err(internal_error)?;
        Ok(roles.into_iter().map(RoleData::from).collect())
    }

    /// Link rows between this user and its roles
    async fn user_roles(&self, ctx: &GraphQLContext) -> FieldResult<Vec<UserRoleData>> {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let links = UserRole::find_by_user(self.id, conn)
            .await
            .map_err(internal_error)?;
        Ok(links.into_iter().map(UserRoleData::from).collect())
    }
}

impl From<User> for UserData {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            phone: u.phone,
            created_by: u.created_by,
            updated_by: u.updated_by,
            created_at: u.created_at,
            updated_at: u.updated_at,
            deleted_at: u.deleted_at,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub phone: Option<String>,
    pub password: String,
    /// Roles to link on creation
    pub role_ids: Option<Vec<ID>>,
}

/// Input for updating a user; omitted fields are left unchanged
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub add_role_ids: Option<Vec<ID>>,
    pub remove_role_ids: Option<Vec<ID>>,
}
