//! GraphQL query resolvers for users

use juniper::{FieldResult, ID};

use crate::common::{internal_error, UserId};
use crate::domains::users::data::UserData;
use crate::domains::users::models::User;
use crate::server::graphql::context::GraphQLContext;

/// Get a single user by ID
pub async fn get_user(ctx: &GraphQLContext, id: ID) -> FieldResult<Option<UserData>> {
    let user_id = UserId::try_from(&id)?;

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;
    let user = User::find_by_id(user_id, conn)
        .await
        .map_err(internal_error)?;

    Ok(user.map(UserData::from))
}

/// All live users, oldest first
pub async fn get_users(ctx: &GraphQLContext) -> FieldResult<Vec<UserData>> {
    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;
    let users = User::find_all(conn).await.map_err(internal_error)?;

    Ok(users.into_iter().map(UserData::from).collect())
}
