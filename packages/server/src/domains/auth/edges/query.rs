//! Login and viewer resolvers

use chrono::Utc;
use juniper::{graphql_value, FieldError, FieldResult};
use tracing::{debug, info};

use crate::common::internal_error;
use crate::domains::auth::data::{LoginPayload, LoginReq, Viewer};
use crate::domains::auth::password::verify_password;
use crate::domains::users::data::UserData;
use crate::domains::users::models::User;
use crate::server::graphql::context::GraphQLContext;

fn invalid_login() -> FieldError {
    FieldError::new(
        "Invalid name or password",
        graphql_value!({
            "code": "UNAUTHENTICATED",
            "reason": "invalid_login"
        }),
    )
}

/// Check the password, issue a credential and set it as the response cookie
pub async fn login(ctx: &GraphQLContext, req: LoginReq) -> FieldResult<LoginPayload> {
    let user = {
        let mut tx = ctx.lock_transaction().await?;
        let conn = tx.connection().map_err(internal_error)?;
        User::find_by_name(req.name.trim(), conn)
            .await
            .map_err(internal_error)?
    };

    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            debug!(name = %req.name, "Login rejected");
            return Err(invalid_login());
        }
    };

    let auth = ctx.auth();
    let credential = auth.codec.issue(user.id.raw()).map_err(internal_error)?;
    ctx.set_response_cookie(auth.cookie.issue(&credential))?;

    info!(user_id = %user.id, "User logged in");
    Ok(LoginPayload {
        user: UserData::from(user),
        expires_at: Utc::now() + auth.codec.ttl(),
    })
}

pub fn viewer(ctx: &GraphQLContext) -> FieldResult<Viewer> {
    ctx.require_identity()?;
    Ok(Viewer)
}
