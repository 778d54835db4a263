//! GraphQL mutation resolvers for roles

use juniper::{FieldResult, ID};
use sqlx::PgConnection;
use tracing::info;

use crate::common::{bad_input, internal_error, not_found, RoleId};
use crate::domains::roles::data::{CreateRoleInput, RoleData, UpdateRoleInput};
use crate::domains::roles::models::Role;
use crate::domains::user_roles::models::UserRole;
use crate::server::graphql::context::GraphQLContext;

fn validate_name(name: &str) -> FieldResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(bad_input("Role name must not be empty"));
    }
    Ok(name.to_string())
}

async fn ensure_name_free(
    name: &str,
    except: Option<RoleId>,
    conn: &mut PgConnection,
) -> FieldResult<()> {
    match Role::find_by_name(name, conn).await.map_err(internal_error)? {
        Some(role) if Some(role.id) != except => {
            Err(bad_input(format!("Role '{}' already exists", name)))
        }
        _ => Ok(()),
    }
}

pub async fn create_role(ctx: &GraphQLContext, input: CreateRoleInput) -> FieldResult<RoleData> {
    let name = validate_name(&input.name)?;
    let actor = ctx.actor();

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;

    ensure_name_free(&name, None, conn).await?;
    let role = Role::insert(&name, actor, conn)
        .await
        .map_err(internal_error)?;

    info!(role_id = %role.id, actor = %actor, "Role created");
    Ok(RoleData::from(role))
}

pub async fn update_role(
    ctx: &GraphQLContext,
    id: ID,
    input: UpdateRoleInput,
) -> FieldResult<RoleData> {
    let role_id = RoleId::try_from(&id)?;
    let name = input.name.as_deref().map(validate_name).transpose()?;
    let actor = ctx.actor();

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;

    if let Some(name) = &name {
        ensure_name_free(name, Some(role_id), conn).await?;
    }
    let role = Role::update(role_id, name.as_deref(), actor, conn)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Role", role_id))?;

    info!(role_id = %role_id, actor = %actor, "Role updated");
    Ok(RoleData::from(role))
}

/// Soft delete a role and drop its user links
pub async fn delete_role(ctx: &GraphQLContext, id: ID) -> FieldResult<bool> {
    let role_id = RoleId::try_from(&id)?;
    let actor = ctx.actor();

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;

    if !Role::soft_delete(role_id, actor, conn)
        .await
        .map_err(internal_error)?
    {
        return Err(not_found("Role", role_id));
    }
    let unlinked = UserRole::unlink_role(role_id, actor, conn)
        .await
        .map_err(internal_error)?;

    info!(role_id = %role_id, actor = %actor, unlinked, "Role deleted");
    Ok(true)
}
