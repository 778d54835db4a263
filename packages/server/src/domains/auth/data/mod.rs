//! Auth GraphQL types

use chrono::{DateTime, Utc};
use juniper::{FieldResult, GraphQLInputObject, GraphQLObject, ID};

use crate::common::{internal_error, UserId};
use crate::domains::users::data::UserData;
use crate::domains::users::models::User;
use crate::server::graphql::context::GraphQLContext;

/// Login credentials
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct LoginReq {
    pub name: String,
    pub password: String,
}

/// Successful login; the credential itself travels in the response cookie
#[derive(Debug, Clone, GraphQLObject)]
#[graphql(context = GraphQLContext)]
pub struct LoginPayload {
    pub user: UserData,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller
///
/// Every field reads the identity bound by the gate for the enclosing
/// `viewer` root field.
pub struct Viewer;

#[juniper::graphql_object(context = GraphQLContext)]
impl Viewer {
    fn user_id(ctx: &GraphQLContext) -> FieldResult<ID> {
        let identity = ctx.require_identity()?;
        Ok(UserId::from_raw(identity.user_id()).to_graphql())
    }

    /// Caller's user record; null if it was deleted after the credential
    /// was issued
    async fn user(ctx: &GraphQLContext) -> FieldResult<Option<UserData>> {
        let user_id = UserId::from_raw(ctx.require_identity()?.user_id());

        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        let user = User::find_by_id(user_id, conn)
            .await
            .map_err(internal_error)?;

        Ok(user.map(UserData::from))
    }
}
