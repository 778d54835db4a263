//! GraphQL schema definition.
//!
//! Root fields are nullable so a failing root field (an auth failure, say)
//! nulls only itself and its siblings still resolve.

use chrono::{DateTime, Utc};
use juniper::{EmptySubscription, FieldResult, RootNode, ID};
use std::sync::Arc;

use super::context::GraphQLContext;
use super::guard::Guarded;
use super::interceptor::AuthInterceptor;
use crate::common::UserId;

use crate::domains::auth::edges as auth_edges;
use crate::domains::roles::edges as role_edges;
use crate::domains::users::edges as user_edges;

use crate::domains::auth::data::{LoginPayload, LoginReq, Viewer};
use crate::domains::roles::data::{CreateRoleInput, RoleData, UpdateRoleInput};
use crate::domains::users::data::{CreateUserInput, UpdateUserInput, UserData};

/// Public facts about the running server
pub struct ServerInfo;

#[juniper::graphql_object(context = GraphQLContext)]
impl ServerInfo {
    fn name() -> &'static str {
        env!("CARGO_PKG_NAME")
    }

    fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn server_time() -> DateTime<Utc> {
        Utc::now()
    }

    /// Identity visible to this field, if any
    fn viewer_id(ctx: &GraphQLContext) -> Option<ID> {
        ctx.identity()
            .map(|identity| UserId::from_raw(identity.user_id()).to_graphql())
    }
}

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange a name and password for a credential cookie
    async fn login(ctx: &GraphQLContext, req: LoginReq) -> FieldResult<Option<LoginPayload>> {
        auth_edges::login(ctx, req).await.map(Some)
    }

    /// The authenticated caller
    fn viewer(ctx: &GraphQLContext) -> FieldResult<Option<Viewer>> {
        auth_edges::viewer(ctx).map(Some)
    }

    fn server_info() -> Option<ServerInfo> {
        Some(ServerInfo)
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn user(ctx: &GraphQLContext, id: ID) -> FieldResult<Option<UserData>> {
        user_edges::get_user(ctx, id).await
    }

    async fn users(ctx: &GraphQLContext) -> FieldResult<Option<Vec<UserData>>> {
        user_edges::get_users(ctx).await.map(Some)
    }

    // =========================================================================
    // Roles
    // =========================================================================

    async fn role(ctx: &GraphQLContext, id: ID) -> FieldResult<Option<RoleData>> {
        role_edges::get_role(ctx, id).await
    }

    async fn roles(ctx: &GraphQLContext) -> FieldResult<Option<Vec<RoleData>>> {
        role_edges::get_roles(ctx).await.map(Some)
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    // =========================================================================
    // Users
    // =========================================================================

    async fn create_user(
        ctx: &GraphQLContext,
        input: CreateUserInput,
    ) -> FieldResult<Option<UserData>> {
        user_edges::create_user(ctx, input).await.map(Some)
    }

    async fn update_user(
        ctx: &GraphQLContext,
        id: ID,
        input: UpdateUserInput,
    ) -> FieldResult<Option<UserData>> {
        user_edges::update_user(ctx, id, input).await.map(Some)
    }

    async fn delete_user(ctx: &GraphQLContext, id: ID) -> FieldResult<Option<bool>> {
        user_edges::delete_user(ctx, id).await.map(Some)
    }

    // =========================================================================
    // Roles
    // =========================================================================

    async fn create_role(
        ctx: &GraphQLContext,
        input: CreateRoleInput,
    ) -> FieldResult<Option<RoleData>> {
        role_edges::create_role(ctx, input).await.map(Some)
    }

    async fn update_role(
        ctx: &GraphQLContext,
        id: ID,
        input: UpdateRoleInput,
    ) -> FieldResult<Option<RoleData>> {
        role_edges::update_role(ctx, id, input).await.map(Some)
    }

    async fn delete_role(ctx: &GraphQLContext, id: ID) -> FieldResult<Option<bool>> {
        role_edges::delete_role(ctx, id).await.map(Some)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Clear the credential cookie
    async fn logout(ctx: &GraphQLContext) -> FieldResult<Option<bool>> {
        auth_edges::logout(ctx).await.map(Some)
    }
}

pub type Schema =
    RootNode<'static, Guarded<Query>, Guarded<Mutation>, EmptySubscription<GraphQLContext>>;

/// Build the schema with every root field behind `interceptor`.
pub fn create_schema(interceptor: Arc<AuthInterceptor>) -> Schema {
    Schema::new(
        Guarded::new(Query, interceptor.clone()),
        Guarded::new(Mutation, interceptor),
        EmptySubscription::new(),
    )
}
