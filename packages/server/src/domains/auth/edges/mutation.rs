//! Logout resolver

use juniper::FieldResult;
use tracing::info;

use crate::server::graphql::context::GraphQLContext;

/// Expire the credential cookie on the client
pub async fn logout(ctx: &GraphQLContext) -> FieldResult<bool> {
    let identity = ctx.require_identity()?;
    ctx.set_response_cookie(ctx.auth().cookie.clear())?;

    info!(user_id = identity.user_id(), "User logged out");
    Ok(true)
}
