//! GraphQL query resolvers for roles

use juniper::{FieldResult, ID};

use crate::common::{internal_error, RoleId};
use crate::domains::roles::data::RoleData;
use crate::domains::roles::models::Role;
use crate::server::graphql::context::GraphQLContext;

pub async fn get_role(ctx: &GraphQLContext, id: ID) -> FieldResult<Option<RoleData>> {
    let role_id = RoleId::try_from(&id)?;

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;
    let role = Role::find_by_id(role_id, conn)
        .await
        .map_err(internal_error)?;

    Ok(role.map(RoleData::from))
}

pub async fn get_roles(ctx: &GraphQLContext) -> FieldResult<Vec<RoleData>> {
    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;
    let roles = Role::find_all(conn).await.map_err(internal_error)?;

    Ok(roles.into_iter().map(RoleData::from).collect())
}
